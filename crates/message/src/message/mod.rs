//! Immutable HTTP messages.
//!
//! [`Request`], [`Response`] and [`ServerRequest`] are cheap to clone handles to
//! shared, never mutated parts. Every `with_*` operation copies the parts, applies
//! the change and wraps the result in a new handle. When the copy is equal to the
//! current parts, the current handle is returned instead, which callers can observe
//! through `ptr_eq`:
//!
//! ```
//! use micro_http_message::message::{Body, Message, Response};
//!
//! let response = Response::new(Body::empty()).with_header("X-Id", "1");
//! assert!(Response::ptr_eq(&response, &response.with_header("x-id", "1")));
//! assert!(!Response::ptr_eq(&response, &response.with_header("x-id", "2")));
//! ```
//!
//! The shared behaviour lives in two traits: [`Message`] for protocol version,
//! headers and body, and [`RequestMessage`] for method, uri and request target.

use http::Method;

use crate::protocol::DEFAULT_VERSION;
use crate::uri::Uri;

mod body;
pub use body::Body;

mod error;
pub use error::{MessageError, ServerRequestError, UploadError};

mod headers;
pub use headers::{HeaderValues, Headers};

mod request;
pub use request::Request;

mod response;
pub use response::{Response, ResponseParts};

mod server_request;
pub use server_request::{ServerRequest, ServerRequestParts};

mod uploaded_file;
pub use uploaded_file::{UploadErrorCode, UploadMover, UploadedFile, UploadedFileParts, UploadedFileTree};

/// The parts every message has.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageParts {
    /// Bare version number, e.g. `"1.1"`
    pub protocol_version: String,
    pub headers: Headers,
    pub body: Body,
}

impl MessageParts {
    pub fn new(body: Body) -> Self {
        Self { protocol_version: DEFAULT_VERSION.to_owned(), headers: Headers::new(), body }
    }
}

/// The parts of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParts {
    pub message: MessageParts,
    pub method: Method,
    pub uri: Uri,
    /// Explicit request target, the origin form of `uri` is used when unset
    pub request_target: Option<String>,
}

impl RequestParts {
    pub fn new(method: Method, uri: Uri, body: Body) -> Self {
        Self { message: MessageParts::new(body), method, uri, request_target: None }
    }
}

/// Protocol version, headers and body of an immutable message.
pub trait Message: Sized {
    fn message_parts(&self) -> &MessageParts;

    /// Returns a message whose parts are a copy of these with `f` applied.
    ///
    /// Implementations return `self` again when `f` left the parts unchanged.
    fn map_message_parts<F: FnOnce(&mut MessageParts)>(&self, f: F) -> Self;

    fn protocol_version(&self) -> &str {
        &self.message_parts().protocol_version
    }

    fn with_protocol_version(&self, version: &str) -> Self {
        self.map_message_parts(|parts| version.clone_into(&mut parts.protocol_version))
    }

    fn headers(&self) -> &Headers {
        &self.message_parts().headers
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers().contains(name)
    }

    /// Returns the values of the header matching `name` case-insensitively.
    fn header(&self, name: &str) -> &[String] {
        self.headers().get(name)
    }

    fn header_line(&self, name: &str) -> String {
        self.headers().line(name)
    }

    /// Replaces the header matching `name`, see [`Headers::set`].
    fn with_header<V: Into<HeaderValues>>(&self, name: &str, value: V) -> Self {
        self.map_message_parts(|parts| parts.headers.set(name, value))
    }

    /// Merges into the header matching `name`, see [`Headers::append`].
    fn with_added_header<V: Into<HeaderValues>>(&self, name: &str, value: V) -> Self {
        self.map_message_parts(|parts| parts.headers.append(name, value))
    }

    fn without_header(&self, name: &str) -> Self {
        self.map_message_parts(|parts| {
            parts.headers.remove(name);
        })
    }

    fn body(&self) -> &Body {
        &self.message_parts().body
    }

    fn with_body(&self, body: Body) -> Self {
        self.map_message_parts(|parts| parts.body = body)
    }
}

/// Method, uri and request target of an immutable request.
pub trait RequestMessage: Message {
    fn request_parts(&self) -> &RequestParts;

    /// Same contract as [`Message::map_message_parts`].
    fn map_request_parts<F: FnOnce(&mut RequestParts)>(&self, f: F) -> Self;

    fn method(&self) -> &Method {
        &self.request_parts().method
    }

    fn with_method(&self, method: Method) -> Self {
        self.map_request_parts(|parts| parts.method = method)
    }

    fn uri(&self) -> &Uri {
        &self.request_parts().uri
    }

    /// Replaces the uri.
    ///
    /// The `Host` header is set from the host and port of `uri` unless
    /// `preserve_host` is true and a `Host` header already exists. A uri without
    /// host never touches the header.
    fn with_uri(&self, uri: Uri, preserve_host: bool) -> Self {
        self.map_request_parts(|parts| {
            let update_host = !preserve_host || !parts.message.headers.contains("host");
            if update_host && !uri.host().is_empty() {
                let host = match uri.port() {
                    Some(port) => format!("{}:{port}", uri.host()),
                    None => uri.host().to_owned(),
                };
                parts.message.headers.set("Host", host);
            }
            parts.uri = uri;
        })
    }

    /// Returns the request target, by default the origin form of the uri.
    fn request_target(&self) -> String {
        let parts = self.request_parts();
        if let Some(target) = &parts.request_target {
            return target.clone();
        }

        let mut target = parts.uri.path().to_owned();
        if !parts.uri.query().is_empty() {
            target.push('?');
            target.push_str(parts.uri.query());
        }
        if target.is_empty() { "/".to_owned() } else { target }
    }

    fn with_request_target(&self, target: &str) -> Self {
        self.map_request_parts(|parts| parts.request_target = Some(target.to_owned()))
    }
}
