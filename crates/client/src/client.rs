use std::fmt;

use micro_http_message::factory::{DefaultResponseFactory, DefaultStreamFactory, ResponseFactory, StreamFactory};
use micro_http_message::message::{Message, Request, RequestMessage, Response};
use micro_http_message::protocol::{reason_phrase, request_body_policy, response_has_body};
use micro_http_message::stream::StreamMetadata;
use tracing::{debug, trace, warn};

use crate::error::ClientError;
use crate::head::{parse_headers, parse_protocol_version, split_raw};
use crate::options::{CURL_OPTIONS_KEY, HttpVersionOption, RequestOptions, TRANSFER_INFO_KEY, TransferOptions};
use crate::transport::{CurlTransport, Transport, TransferInfo, TransferOutput};

/// Sends requests and returns their responses.
pub trait Client {
    fn send_request(&mut self, request: &Request) -> Result<Response, ClientError>;
}

/// Builder for [`CurlClient`].
pub struct CurlClientBuilder<T: Transport = CurlTransport> {
    transport: T,
    options: TransferOptions,
    streams: Box<dyn StreamFactory + Send>,
    responses: Box<dyn ResponseFactory + Send>,
}

impl CurlClientBuilder<CurlTransport> {
    fn new() -> Self {
        Self {
            transport: CurlTransport::new(),
            options: TransferOptions::default(),
            streams: Box::new(DefaultStreamFactory),
            responses: Box::new(DefaultResponseFactory::default()),
        }
    }
}

impl<T: Transport> CurlClientBuilder<T> {
    /// Replaces the transfer engine.
    pub fn transport<U: Transport>(self, transport: U) -> CurlClientBuilder<U> {
        CurlClientBuilder { transport, options: self.options, streams: self.streams, responses: self.responses }
    }

    /// Sets the options used for requests that carry none of their own.
    pub fn options(mut self, options: TransferOptions) -> Self {
        self.options = options;
        self
    }

    /// Connection timeout in seconds.
    pub fn connect_timeout(mut self, seconds: u64) -> Self {
        self.options.connect_timeout = seconds;
        self
    }

    pub fn max_redirects(mut self, max_redirects: u32) -> Self {
        self.options.max_redirects = max_redirects;
        self
    }

    pub fn stream_factory(mut self, streams: impl StreamFactory + Send + 'static) -> Self {
        self.streams = Box::new(streams);
        self
    }

    pub fn response_factory(mut self, responses: impl ResponseFactory + Send + 'static) -> Self {
        self.responses = Box::new(responses);
        self
    }

    pub fn build(self) -> CurlClient<T> {
        CurlClient { transport: self.transport, options: self.options, streams: self.streams, responses: self.responses }
    }
}

impl<T: Transport> fmt::Debug for CurlClientBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurlClientBuilder").field("options", &self.options).finish_non_exhaustive()
    }
}

/// A blocking HTTP client driving a libcurl easy handle.
///
/// One transfer runs per call. The handle is created on the first request, reused by
/// the following ones and released by [`CurlClient::close`] or when the client is
/// dropped.
///
/// Transfer options come, in order of precedence, from the `curl-options` metadata
/// entry of the request body, from the options the client was built with, and from
/// [`TransferOptions::default`].
pub struct CurlClient<T: Transport = CurlTransport> {
    transport: T,
    options: TransferOptions,
    streams: Box<dyn StreamFactory + Send>,
    responses: Box<dyn ResponseFactory + Send>,
}

impl CurlClient<CurlTransport> {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> CurlClientBuilder<CurlTransport> {
        CurlClientBuilder::new()
    }
}

impl Default for CurlClient<CurlTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> CurlClient<T> {
    pub fn options(&self) -> &TransferOptions {
        &self.options
    }

    /// Sends `request` with options taken from its body metadata or the client.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Network`] if the engine fails for network or TLS reasons
    /// - [`ClientError::Request`] for any other failure
    pub fn send_request(&mut self, request: &Request) -> Result<Response, ClientError> {
        let options = match request.body().metadata().and_then(|mut metadata| metadata.extra.remove(CURL_OPTIONS_KEY)) {
            Some(value) => serde_json::from_value(value).map_err(|e| ClientError::wrap(request, e))?,
            None => self.options.clone(),
        };
        self.send_request_with_options(request, options)
    }

    /// Sends `request` with the given options, ignoring any options in its body metadata.
    pub fn send_request_with_options(&mut self, request: &Request, options: TransferOptions) -> Result<Response, ClientError> {
        debug!(method = %request.method(), uri = %request.uri(), "sending request");

        self.transport.open().map_err(|e| {
            warn!(code = e.code, cause = %e.message, "unable to initialize a cURL session");
            ClientError::request_error(request, "unable to initialize a cURL session", e.code)
        })?;

        let options = request_options(request, options);
        trace!(?options, "applying cURL options");
        self.transport.configure(&options).map_err(|e| {
            warn!(code = e.code, cause = %e.message, "invalid cURL options");
            ClientError::request_error(request, format!("invalid options to set for cURL transfer: {}", e.message), e.code)
        })?;

        let output = self.transport.perform().map_err(|e| {
            warn!(code = e.code, cause = %e.message, url = %options.url, "cURL transfer failed");
            ClientError::from_code(request, e.message, e.code)
        })?;

        let info = self.transport.info();
        self.create_response(output, info).map_err(|e| ClientError::wrap(request, e))
    }

    /// Releases the native handle. Calling it again has no effect.
    pub fn close(&mut self) {
        self.transport.close();
    }

    fn create_response(&self, output: TransferOutput, info: TransferInfo) -> Result<Response, serde_json::Error> {
        let (head, body) = match output {
            TransferOutput::Captured(raw) => split_raw(&raw, info.header_size),
            TransferOutput::Completed => Default::default(),
        };
        let head = String::from_utf8_lossy(&head);

        let metadata = StreamMetadata::default().with_entry(TRANSFER_INFO_KEY, serde_json::to_value(&info)?);
        let body = self.streams.create_stream(body, metadata);

        debug!(status = info.http_code, url = %info.url, "received response");
        Ok(self.responses.create_response(
            info.http_code,
            reason_phrase(info.http_code).unwrap_or_default(),
            parse_protocol_version(&head),
            parse_headers(&head),
            body,
        ))
    }
}

impl<T: Transport> Client for CurlClient<T> {
    fn send_request(&mut self, request: &Request) -> Result<Response, ClientError> {
        CurlClient::send_request(self, request)
    }
}

impl<T: Transport> Drop for CurlClient<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T: Transport> fmt::Debug for CurlClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurlClient").field("options", &self.options).finish_non_exhaustive()
    }
}

fn request_options(request: &Request, transfer: TransferOptions) -> RequestOptions {
    let method = request.method();

    let sends_body = request_body_policy(method).allows_body() && request.body().size().is_some_and(|size| size > 0);
    let body = sends_body.then(|| request.body().to_bytes());

    RequestOptions {
        headers: request.headers().iter().map(|(name, values)| format!("{name}: {}", values.join(", "))).collect(),
        body,
        http_version: HttpVersionOption::from_protocol(request.protocol_version()),
        return_transfer: response_has_body(method),
        ..RequestOptions::new(request.uri().to_string(), method.as_str(), transfer)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::Method;
    use micro_http_message::message::Body;
    use micro_http_message::uri::Uri;
    use serde_json::json;

    use super::*;
    use crate::transport::{MockTransport, NativeError, codes};

    fn request(method: Method, body: &'static [u8]) -> Request {
        let body = DefaultStreamFactory.create_stream(Bytes::from_static(body), StreamMetadata::default());
        Request::new(method, "http://example.com/path?q=1".parse::<Uri>().unwrap(), body)
    }

    fn info(code: u16, header_size: usize) -> TransferInfo {
        TransferInfo { url: "http://example.com/path?q=1".to_owned(), http_code: code, header_size, ..Default::default() }
    }

    /// A transport answering every transfer with `raw`.
    fn answering(raw: &'static [u8], info: TransferInfo) -> MockTransport {
        let mut transport = MockTransport::new();
        transport.expect_open().returning(|| Ok(()));
        transport.expect_configure().returning(|_| Ok(()));
        transport.expect_perform().returning(move || Ok(TransferOutput::Captured(Bytes::from_static(raw))));
        transport.expect_info().returning(move || info.clone());
        transport.expect_close().return_const(());
        transport
    }

    fn failing(code: i32, message: &'static str) -> MockTransport {
        let mut transport = MockTransport::new();
        transport.expect_open().returning(|| Ok(()));
        transport.expect_configure().returning(|_| Ok(()));
        transport.expect_perform().returning(move || Err(NativeError::new(code, message)));
        transport.expect_close().return_const(());
        transport
    }

    fn client<T: Transport>(transport: T) -> CurlClient<T> {
        CurlClient::builder().transport(transport).build()
    }

    #[test]
    fn builds_response_from_captured_transfer() {
        let mut client = client(answering(b"HTTP/1.1 200 OK\r\nX: y\r\n\r\nbody", info(200, 23)));

        let response = client.send_request(&request(Method::GET, b"")).unwrap();

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.reason_phrase(), "OK");
        assert_eq!(response.header("X"), ["y"]);
        assert_eq!(response.protocol_version(), "1.1");
        assert_eq!(response.body().to_bytes(), Bytes::from_static(b"body"));
    }

    #[test]
    fn response_body_carries_transfer_info() {
        let mut client = client(answering(b"HTTP/2 404\r\n\r\n", info(404, 14)));

        let response = client.send_request(&request(Method::GET, b"")).unwrap();

        assert_eq!(response.protocol_version(), "2");
        assert_eq!(response.reason_phrase(), "Not Found");
        let metadata = response.body().metadata().unwrap();
        assert_eq!(metadata.get(TRANSFER_INFO_KEY).unwrap()["http_code"], json!(404));
        assert_eq!(metadata.get(TRANSFER_INFO_KEY).unwrap()["header_size"], json!(14));
    }

    #[test]
    fn unknown_status_has_empty_reason() {
        let mut client = client(answering(b"HTTP/1.1 999 Odd\r\n\r\n", info(999, 20)));

        let response = client.send_request(&request(Method::GET, b"")).unwrap();
        assert_eq!(response.status_code(), 999);
        assert_eq!(response.reason_phrase(), "");
    }

    #[test]
    fn completed_transfer_has_empty_body() {
        let mut transport = MockTransport::new();
        transport.expect_open().returning(|| Ok(()));
        transport.expect_configure().withf(|options| !options.return_transfer).returning(|_| Ok(()));
        transport.expect_perform().returning(|| Ok(TransferOutput::Completed));
        transport.expect_info().returning(|| info(200, 120));
        transport.expect_close().return_const(());

        let response = client(transport).send_request(&request(Method::HEAD, b"")).unwrap();

        assert_eq!(response.status_code(), 200);
        assert!(response.headers().is_empty());
        assert_eq!(response.protocol_version(), "1.1");
        assert_eq!(response.body().to_bytes(), Bytes::new());
    }

    #[test]
    fn resolve_failure_is_a_network_error() {
        let mut client = client(failing(codes::COULDNT_RESOLVE_HOST, "Could not resolve host: example.com"));

        let err = client.send_request(&request(Method::GET, b"")).unwrap_err();

        assert!(err.is_network());
        assert_eq!(err.code(), 6);
        assert_eq!(err.to_string(), "Could not resolve host: example.com");
        assert_eq!(err.request().uri().host(), "example.com");
    }

    #[test]
    fn tls_failures_are_network_errors() {
        for code in [codes::SSL_CONNECT_ERROR, codes::PEER_FAILED_VERIFICATION, codes::SSL_CACERT_BADFILE, codes::OPERATION_TIMEDOUT] {
            let err = client(failing(code, "tls")).send_request(&request(Method::GET, b"")).unwrap_err();
            assert!(err.is_network(), "{code}");
        }
    }

    #[test]
    fn malformed_url_is_a_request_error() {
        let mut client = client(failing(codes::URL_MALFORMAT, "URL using bad/illegal format or missing URL"));

        let err = client.send_request(&request(Method::GET, b"")).unwrap_err();

        assert!(!err.is_network());
        assert!(matches!(err, ClientError::Request { code: 3, source: None, .. }));
    }

    #[test]
    fn open_failure_is_a_request_error() {
        let mut transport = MockTransport::new();
        transport.expect_open().returning(|| Err(NativeError::new(codes::FAILED_INIT, "out of memory")));
        transport.expect_configure().never();
        transport.expect_close().return_const(());

        let err = client(transport).send_request(&request(Method::GET, b"")).unwrap_err();
        assert_eq!(err.to_string(), "unable to initialize a cURL session");
        assert_eq!(err.code(), codes::FAILED_INIT);
    }

    #[test]
    fn invalid_options_are_a_request_error() {
        let mut transport = MockTransport::new();
        transport.expect_open().returning(|| Ok(()));
        transport.expect_configure().returning(|_| Err(NativeError::new(1, "Unsupported protocol")));
        transport.expect_perform().never();
        transport.expect_close().return_const(());

        let err = client(transport).send_request(&request(Method::GET, b"")).unwrap_err();
        assert!(matches!(err, ClientError::Request { code: 1, .. }));
        assert!(err.to_string().contains("Unsupported protocol"));
    }

    #[test]
    fn get_without_body_policy_never_sends_body() {
        let options = request_options(&request(Method::HEAD, b"ignored"), TransferOptions::default());
        assert_eq!(options.body, None);
        assert!(!options.return_transfer);

        let options = request_options(&request(Method::DELETE, b"ignored"), TransferOptions::default());
        assert_eq!(options.body, None);
    }

    #[test]
    fn post_sends_non_empty_body() {
        let options = request_options(&request(Method::POST, b"payload"), TransferOptions::default());
        assert_eq!(options.body, Some(Bytes::from_static(b"payload")));
        assert!(options.return_transfer);

        let options = request_options(&request(Method::POST, b""), TransferOptions::default());
        assert_eq!(options.body, None);
    }

    #[test]
    fn optional_body_is_sent_when_present() {
        let options = request_options(&request(Method::GET, b"query"), TransferOptions::default());
        assert_eq!(options.body, Some(Bytes::from_static(b"query")));
    }

    #[test]
    fn request_options_mapping() {
        let request = request(Method::PUT, b"{}")
            .with_header("Content-Type", "application/json")
            .with_header("Accept", "text/plain;text/html")
            .with_protocol_version("2.0");

        let options = request_options(&request, TransferOptions::default());

        assert_eq!(options.url, "http://example.com/path?q=1");
        assert_eq!(options.method, "PUT");
        assert_eq!(options.headers, ["Content-Type: application/json", "Accept: text/plain, text/html"]);
        assert_eq!(options.http_version, HttpVersionOption::Http2);
        assert_eq!(options.transfer, TransferOptions::default());
    }

    #[test]
    fn body_metadata_overrides_options() {
        let mut transport = MockTransport::new();
        transport.expect_open().returning(|| Ok(()));
        transport
            .expect_configure()
            .withf(|options| options.transfer.max_redirects == 0 && !options.transfer.follow_location)
            .returning(|_| Ok(()));
        transport.expect_perform().returning(|| Ok(TransferOutput::Captured(Bytes::from_static(b"HTTP/1.1 200 OK\r\n\r\n"))));
        transport.expect_info().returning(|| info(200, 19));
        transport.expect_close().return_const(());

        let metadata = StreamMetadata::default().with_entry(CURL_OPTIONS_KEY, json!({"max_redirects": 0, "follow_location": false}));
        let body = DefaultStreamFactory.create_stream(Bytes::new(), metadata);
        let request = Request::new(Method::GET, "http://example.com/".parse::<Uri>().unwrap(), body);

        client(transport).send_request(&request).unwrap();
    }

    #[test]
    fn invalid_metadata_options_are_wrapped() {
        let mut transport = MockTransport::new();
        transport.expect_open().never();
        transport.expect_close().return_const(());

        let metadata = StreamMetadata::default().with_entry(CURL_OPTIONS_KEY, json!({"max_redirects": "many"}));
        let request = Request::new(Method::GET, Uri::default(), Body::new(micro_http_message::stream::ResourceStream::memory(metadata)));

        let err = client(transport).send_request(&request).unwrap_err();
        assert_eq!(err.to_string(), "error while creating cURL request");
        assert!(matches!(err, ClientError::Request { source: Some(_), .. }));
    }

    #[test]
    fn explicit_options_win_over_metadata() {
        let mut transport = MockTransport::new();
        transport.expect_open().returning(|| Ok(()));
        transport.expect_configure().withf(|options| options.transfer.timeout == Some(3)).returning(|_| Ok(()));
        transport.expect_perform().returning(|| Ok(TransferOutput::Completed));
        transport.expect_info().returning(|| info(204, 0));
        transport.expect_close().return_const(());

        let metadata = StreamMetadata::default().with_entry(CURL_OPTIONS_KEY, json!({"timeout": 60}));
        let body = DefaultStreamFactory.create_stream(Bytes::new(), metadata);
        let request = Request::new(Method::GET, Uri::default(), body);

        let options = TransferOptions { timeout: Some(3), ..Default::default() };
        let response = client(transport).send_request_with_options(&request, options).unwrap();
        assert_eq!(response.status_code(), 204);
    }

    #[test]
    fn builder_adjusts_options() {
        let mut transport = MockTransport::new();
        transport.expect_close().return_const(());

        let client = CurlClient::builder().connect_timeout(5).max_redirects(0).transport(transport).build();

        assert_eq!(client.options().connect_timeout, 5);
        assert_eq!(client.options().max_redirects, 0);
        assert!(client.options().follow_location);
    }

    #[test]
    fn handle_is_reused_and_closed_once_per_close() {
        let mut transport = MockTransport::new();
        transport.expect_open().times(2).returning(|| Ok(()));
        transport.expect_configure().times(2).returning(|_| Ok(()));
        transport.expect_perform().times(2).returning(|| Ok(TransferOutput::Completed));
        transport.expect_info().times(2).returning(|| info(200, 0));
        // explicit close, a second explicit close and the drop
        transport.expect_close().times(3).return_const(());

        let mut client = client(transport);
        client.send_request(&request(Method::HEAD, b"")).unwrap();
        client.send_request(&request(Method::HEAD, b"")).unwrap();
        client.close();
        client.close();
    }
}
