use triomphe::Arc;

use super::{Body, Message, MessageParts};
use crate::copy_on_write;
use crate::protocol::reason_phrase;

/// The parts of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseParts {
    pub message: MessageParts,
    pub status: u16,
    /// Explicit reason phrase, empty to use the canonical one
    pub reason: String,
}

impl ResponseParts {
    pub fn new(body: Body) -> Self {
        Self { message: MessageParts::new(body), status: 200, reason: String::new() }
    }
}

/// An immutable response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    inner: Arc<ResponseParts>,
}

impl Response {
    /// Creates a `200` response with protocol version `1.1` and no headers.
    pub fn new(body: Body) -> Self {
        Self::from_parts(ResponseParts::new(body))
    }

    pub fn from_parts(parts: ResponseParts) -> Self {
        Self { inner: Arc::new(parts) }
    }

    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }

    pub fn status_code(&self) -> u16 {
        self.inner.status
    }

    /// Returns the explicit reason phrase, or the canonical phrase of the status code.
    ///
    /// Unknown status codes without explicit phrase yield an empty string.
    pub fn reason_phrase(&self) -> &str {
        if self.inner.reason.is_empty() {
            reason_phrase(self.inner.status).unwrap_or_default()
        } else {
            &self.inner.reason
        }
    }

    pub fn with_status(&self, code: u16, reason: &str) -> Self {
        self.update(|parts| {
            parts.status = code;
            reason.clone_into(&mut parts.reason);
        })
    }

    fn update<F: FnOnce(&mut ResponseParts)>(&self, f: F) -> Self {
        Self { inner: copy_on_write(&self.inner, f) }
    }
}

impl Message for Response {
    fn message_parts(&self) -> &MessageParts {
        &self.inner.message
    }

    fn map_message_parts<F: FnOnce(&mut MessageParts)>(&self, f: F) -> Self {
        self.update(|parts| f(&mut parts.message))
    }
}
