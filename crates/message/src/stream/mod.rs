//! Byte streams backed by OS resources.
//!
//! A [`Stream`] wraps a single readable and/or writable resource and tracks its
//! lifecycle:
//!
//! ```text
//! Active --close()--> Closed --(implicit)--> Detached
//!   |                                           ^
//!   +------------------detach()-----------------+
//! ```
//!
//! Every positioned operation (`tell`, `eof`, `seek`, `read`, `write`, `contents`)
//! first fails with [`StreamError::Closed`] / [`StreamError::Detached`] when the
//! stream left the active state, and then checks the matching capability flag of the
//! [`StreamMetadata`].
//!
//! Two implementations are provided:
//!
//! - [`ResourceStream`]: owns a [`Resource`] (file, memory buffer, standard io)
//! - [`LazyStream`]: runs a factory on first use and forwards to the stream it produced

use std::fmt::Debug;
use std::io::SeekFrom;

use bytes::Bytes;

mod error;
pub use error::StreamError;

mod lazy;
pub use lazy::LazyStream;

mod metadata;
pub use metadata::StreamMetadata;

mod mode;
pub use mode::OpenMode;

mod resource;
pub use resource::Resource;

mod resource_stream;
pub use resource_stream::ResourceStream;

/// A byte stream with an explicit lifecycle.
///
/// Methods take `&mut self` even for queries, a lazy stream has to be resolved
/// before it can answer them.
pub trait Stream: Debug + Send {
    /// Closes the underlying resource and detaches it. Calling it again has no effect.
    fn close(&mut self);

    /// Separates the resource from the stream, leaving the stream unusable.
    ///
    /// Returns `None` if the resource was already detached or closed.
    fn detach(&mut self) -> Option<Resource>;

    /// Returns the size in bytes, `None` if unknown.
    fn size(&mut self) -> Option<u64>;

    /// Returns the current position of the read/write pointer.
    fn tell(&mut self) -> Result<u64, StreamError>;

    /// Returns true once a read hit the end of the stream.
    fn eof(&mut self) -> Result<bool, StreamError>;

    fn is_seekable(&mut self) -> bool;

    fn seek(&mut self, position: SeekFrom) -> Result<(), StreamError>;

    /// Seeks to the beginning of the stream.
    fn rewind(&mut self) -> Result<(), StreamError> {
        self.seek(SeekFrom::Start(0))
    }

    fn is_writable(&mut self) -> bool;

    /// Writes all of `bytes`, returning the number of bytes written.
    fn write(&mut self, bytes: &[u8]) -> Result<usize, StreamError>;

    fn is_readable(&mut self) -> bool;

    /// Reads up to `length` bytes.
    ///
    /// A negative length fails with [`StreamError::NegativeLength`], a zero length
    /// returns empty bytes without touching the resource.
    fn read(&mut self, length: isize) -> Result<Bytes, StreamError>;

    /// Reads the remainder of the stream.
    fn contents(&mut self) -> Result<Bytes, StreamError>;

    /// Returns the stream metadata, `None` if the stream could not be created.
    fn metadata(&mut self) -> Option<&StreamMetadata>;

    /// Reads the whole stream from the beginning.
    ///
    /// This never fails: any error results in empty bytes.
    fn to_bytes(&mut self) -> Bytes {
        if self.is_seekable() && self.rewind().is_err() {
            return Bytes::new();
        }
        self.contents().unwrap_or_default()
    }
}
