use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use triomphe::Arc;

use crate::stream::{ResourceStream, Stream, StreamMetadata};

/// A shared handle to the [`Stream`] carrying a message body.
///
/// Cloning the handle does not copy the stream: messages derived through `with_*`
/// keep pointing at the same stream until [`Message::with_body`] hands them a new
/// one. Two bodies are equal only if they share the stream.
///
/// [`Message::with_body`]: super::Message::with_body
#[derive(Clone)]
pub struct Body {
    stream: Arc<Mutex<Box<dyn Stream>>>,
}

impl Body {
    pub fn new<S: Stream + 'static>(stream: S) -> Self {
        Self::from_boxed(Box::new(stream))
    }

    pub fn from_boxed(stream: Box<dyn Stream>) -> Self {
        Self { stream: Arc::new(Mutex::new(stream)) }
    }

    /// Creates a body over a new empty in-memory stream.
    pub fn empty() -> Self {
        Self::new(ResourceStream::memory(StreamMetadata::default()))
    }

    /// Locks the stream for direct access.
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn Stream>> {
        self.stream.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.stream, &other.stream)
    }

    pub fn size(&self) -> Option<u64> {
        self.lock().size()
    }

    /// Reads the whole stream from the beginning, see [`Stream::to_bytes`].
    pub fn to_bytes(&self) -> Bytes {
        self.lock().to_bytes()
    }

    /// Returns a copy of the stream metadata.
    pub fn metadata(&self) -> Option<StreamMetadata> {
        self.lock().metadata().cloned()
    }

    /// Returns the `uri` metadata entry of the stream.
    pub fn uri(&self) -> Option<String> {
        self.lock().metadata().and_then(|metadata| metadata.uri.clone())
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Body {
    fn eq(&self, other: &Self) -> bool {
        Body::ptr_eq(self, other)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stream.try_lock() {
            Ok(stream) => f.debug_tuple("Body").field(&*stream).finish(),
            Err(_) => f.write_str("Body(<locked>)"),
        }
    }
}
