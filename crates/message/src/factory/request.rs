use http::Method;

use super::DefaultStreamFactory;
use crate::message::{Headers, MessageError, MessageParts, Request, RequestParts};
use crate::stream::StreamMetadata;
use crate::uri::Uri;

/// Creates outgoing requests.
pub trait RequestFactory {
    fn create_request(&self, method: &str, uri: Uri, version: &str, headers: Headers) -> Result<Request, MessageError>;
}

/// Creates requests whose body is an empty temporary file stream.
#[derive(Debug, Default, Clone)]
pub struct DefaultRequestFactory {
    streams: DefaultStreamFactory,
}

impl RequestFactory for DefaultRequestFactory {
    fn create_request(&self, method: &str, uri: Uri, version: &str, headers: Headers) -> Result<Request, MessageError> {
        let method = parse_method(method)?;
        let body = self.streams.create_temp_file_stream(StreamMetadata::default());
        Ok(Request::from_parts(RequestParts {
            message: MessageParts { protocol_version: version.to_owned(), headers, body },
            method,
            uri,
            request_target: None,
        }))
    }
}

pub(crate) fn parse_method(method: &str) -> Result<Method, MessageError> {
    Method::from_bytes(method.as_bytes()).ok().ok_or_else(|| MessageError::invalid_method(method))
}
