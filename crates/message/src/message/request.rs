use http::Method;
use triomphe::Arc;

use super::{Body, Message, MessageParts, RequestMessage, RequestParts};
use crate::copy_on_write;
use crate::uri::Uri;

/// An immutable outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    inner: Arc<RequestParts>,
}

impl Request {
    /// Creates a `1.1` request without headers.
    pub fn new(method: Method, uri: Uri, body: Body) -> Self {
        Self::from_parts(RequestParts::new(method, uri, body))
    }

    pub fn from_parts(parts: RequestParts) -> Self {
        Self { inner: Arc::new(parts) }
    }

    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }
}

impl Message for Request {
    fn message_parts(&self) -> &MessageParts {
        &self.inner.message
    }

    fn map_message_parts<F: FnOnce(&mut MessageParts)>(&self, f: F) -> Self {
        self.map_request_parts(|parts| f(&mut parts.message))
    }
}

impl RequestMessage for Request {
    fn request_parts(&self) -> &RequestParts {
        &self.inner
    }

    fn map_request_parts<F: FnOnce(&mut RequestParts)>(&self, f: F) -> Self {
        Self { inner: copy_on_write(&self.inner, f) }
    }
}
