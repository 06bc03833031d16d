//! Immutable HTTP messages, URI values and resource backed byte streams
//!
//! This crate provides the value types a blocking HTTP client or a CGI style
//! server works with: a request, a response, a server side request, the URI they
//! point at and the byte stream that carries their body.
//!
//! # Features
//!
//! - Immutable values: every `with_*` operation returns a new value and leaves
//!   the original untouched
//! - Identity preservation: a `with_*` call that would not change anything
//!   returns the very same instance (observable through `ptr_eq`)
//! - Case-insensitive header access which keeps the original header casing
//! - Streams over files, memory buffers and the standard io handles, with an
//!   explicit open/closed/detached lifecycle
//! - Lazily opened streams, so a body is only touched when someone reads it
//!
//! # Example
//!
//! ```no_run
//! use micro_http_message::factory::{DefaultStreamFactory, StreamFactory};
//! use micro_http_message::message::{Message, Request, RequestMessage};
//! use micro_http_message::stream::StreamMetadata;
//! use micro_http_message::uri::UriFactory;
//!
//! let uri = UriFactory.create_uri("https://example.com:8443/search?q=rust").unwrap();
//! let body = DefaultStreamFactory.create_stream("hello".into(), StreamMetadata::default());
//!
//! let request = Request::new(http::Method::POST, uri, body)
//!     .with_header("Accept", "text/plain;text/html")
//!     .with_added_header("accept", "text/plain");
//!
//! assert_eq!(request.header_line("ACCEPT"), "text/plain, text/html");
//! assert_eq!(request.request_target(), "/search?q=rust");
//! ```
//!
//! # Architecture
//!
//! - [`uri`]: the [`uri::Uri`] value type, its component parser and the uri factory
//! - [`stream`]: the [`stream::Stream`] trait, the resource backed stream and the lazy stream
//! - [`message`]: request, response, server request and uploaded file types
//! - [`protocol`]: fixed protocol tables (body policies, reason phrases, versions)
//! - [`factory`]: default collaborators creating streams, requests and responses
//!
//! # Error Handling
//!
//! Every module owns its error type:
//!
//! - [`uri::UriError`]: invalid ports and malformed uri strings
//! - [`stream::StreamError`]: lifecycle, capability and io failures of streams
//! - [`message::MessageError`]: invalid method tokens
//! - [`message::UploadError`]: failed uploaded file moves

pub mod factory;
pub mod message;
pub mod protocol;
pub mod stream;
pub mod uri;

mod utils;
pub(crate) use utils::{copy_on_write, ensure};
