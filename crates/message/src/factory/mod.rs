//! Default collaborators creating streams, messages and uploaded files.
//!
//! The client only depends on the [`StreamFactory`] and [`ResponseFactory`] traits,
//! the remaining factories serve CGI style servers building a [`ServerRequest`] from
//! their environment.
//!
//! [`ServerRequest`]: crate::message::ServerRequest

mod request;
pub use request::{DefaultRequestFactory, RequestFactory};

mod response;
pub use response::{DefaultResponseFactory, ResponseFactory};

mod server_request;
pub use server_request::{FileSpec, ServerRequestFactory, UploadSpec};

mod stream;
pub use stream::{DefaultStreamFactory, StreamFactory};

mod upload;
pub use upload::{FsUploadMover, UploadedFileFactory};
