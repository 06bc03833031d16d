use bytes::Bytes;
use serde::Serialize;

use super::{DefaultStreamFactory, StreamFactory};
use crate::message::{Body, Headers, Message, MessageError, MessageParts, Response, ResponseParts, ServerRequestError};
use crate::protocol::DEFAULT_VERSION;
use crate::stream::StreamMetadata;

const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";
const HTML_CONTENT_TYPE: &str = "text/html;charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// Creates responses.
pub trait ResponseFactory {
    fn create_response(&self, code: u16, reason: &str, version: &str, headers: Headers, body: Body) -> Response;
}

#[derive(Debug, Default, Clone)]
pub struct DefaultResponseFactory {
    streams: DefaultStreamFactory,
}

impl ResponseFactory for DefaultResponseFactory {
    fn create_response(&self, code: u16, reason: &str, version: &str, headers: Headers, body: Body) -> Response {
        Response::from_parts(ResponseParts {
            message: MessageParts { protocol_version: version.to_owned(), headers, body },
            status: code,
            reason: reason.to_owned(),
        })
    }
}

impl DefaultResponseFactory {
    /// Creates a response whose body is the pretty printed json of `body`.
    ///
    /// A `Content-type` header is added unless `headers` already has one.
    pub fn create_json<T: Serialize + ?Sized>(&self, code: u16, body: &T, headers: Headers) -> Result<Response, MessageError> {
        let content = serde_json::to_vec_pretty(body)?;
        let metadata = StreamMetadata { media_type: Some(mime::APPLICATION_JSON), ..Default::default() };
        let body = self.streams.create_stream(Bytes::from(content), metadata);
        Ok(with_default_content_type(self.create_response(code, "", DEFAULT_VERSION, headers, body), JSON_CONTENT_TYPE))
    }

    /// Creates a response carrying an html document.
    pub fn create_html(&self, code: u16, html: &str, headers: Headers) -> Response {
        let metadata = StreamMetadata { media_type: Some(mime::TEXT_HTML_UTF_8), ..Default::default() };
        let body = self.streams.create_stream(Bytes::copy_from_slice(html.as_bytes()), metadata);
        with_default_content_type(self.create_response(code, "", DEFAULT_VERSION, headers, body), HTML_CONTENT_TYPE)
    }

    /// Creates the response answering a refused request: its status code and its
    /// message as a plain text body.
    pub fn create_error(&self, error: &ServerRequestError, headers: Headers) -> Response {
        let metadata = StreamMetadata { media_type: Some(mime::TEXT_PLAIN_UTF_8), ..Default::default() };
        let body = self.streams.create_stream(Bytes::copy_from_slice(error.message().as_bytes()), metadata);
        with_default_content_type(self.create_response(error.status_code(), "", DEFAULT_VERSION, headers, body), TEXT_CONTENT_TYPE)
    }
}

fn with_default_content_type(response: Response, content_type: &str) -> Response {
    if response.has_header("Content-type") { response } else { response.with_header("Content-type", content_type) }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn create_response() {
        let headers: Headers = [("X-Id", "1")].into_iter().collect();
        let response = DefaultResponseFactory::default().create_response(418, "", "2", headers, Body::empty());

        assert_eq!(response.status_code(), 418);
        assert_eq!(response.reason_phrase(), "I'm a teapot");
        assert_eq!(response.protocol_version(), "2");
        assert_eq!(response.header_line("x-id"), "1");
    }

    #[test]
    fn create_json() {
        let response = DefaultResponseFactory::default().create_json(201, &json!({"name": "zava"}), Headers::new()).unwrap();

        assert_eq!(response.status_code(), 201);
        assert_eq!(response.header("content-type"), ["application/json", "charset=utf-8"]);
        let body: serde_json::Value = serde_json::from_slice(&response.body().to_bytes()).unwrap();
        assert_eq!(body, json!({"name": "zava"}));
        assert_eq!(response.body().metadata().unwrap().media_type, Some(mime::APPLICATION_JSON));
    }

    #[test]
    fn create_json_keeps_content_type() {
        let headers: Headers = [("content-type", "application/problem+json")].into_iter().collect();
        let response = DefaultResponseFactory::default().create_json(400, &json!({"title": "bad"}), headers).unwrap();

        assert_eq!(response.header_line("Content-Type"), "application/problem+json");
    }

    #[test]
    fn create_error() {
        let factory = DefaultResponseFactory::default();

        let response = factory.create_error(&ServerRequestError::MethodNotAllowed(None), Headers::new());
        assert_eq!(response.status_code(), 405);
        assert_eq!(response.reason_phrase(), "Method Not Allowed");
        assert_eq!(response.header_line("content-type"), "text/plain, charset=utf-8");
        assert_eq!(response.body().to_bytes(), Bytes::from_static(b"Method Not Allowed"));

        let response = factory.create_error(&ServerRequestError::unauthorized("token expired"), Headers::new());
        assert_eq!(response.status_code(), 401);
        assert_eq!(response.body().to_bytes(), Bytes::from_static(b"token expired"));
    }

    #[test]
    fn create_html() {
        let response = DefaultResponseFactory::default().create_html(200, "<p>hi</p>", Headers::new());

        assert_eq!(response.header_line("content-type"), "text/html, charset=utf-8");
        assert_eq!(response.body().to_bytes(), Bytes::from_static(b"<p>hi</p>"));
    }
}
