use std::fmt;
use std::io::SeekFrom;
use std::mem;

use bytes::Bytes;
use tracing::{trace, warn};

use super::{Resource, Stream, StreamError, StreamMetadata};

type StreamFactoryFn = Box<dyn FnOnce() -> Result<Box<dyn Stream>, StreamError> + Send>;

enum State {
    Pending(StreamFactoryFn),
    Ready(Box<dyn Stream>),
    Failed(String),
}

/// A [`Stream`] created on first use.
///
/// The factory runs at most once. If it fails, the failure is remembered: operations
/// returning a `Result` fail with [`StreamError::Unavailable`], the others answer as
/// an unusable stream would (`None`, `false`, no-op).
pub struct LazyStream {
    state: State,
}

impl LazyStream {
    pub fn new<F, S>(factory: F) -> Self
    where
        F: FnOnce() -> Result<S, StreamError> + Send + 'static,
        S: Stream + 'static,
    {
        let factory: StreamFactoryFn = Box::new(move || factory().map(|stream| Box::new(stream) as Box<dyn Stream>));
        Self { state: State::Pending(factory) }
    }

    /// Returns true once the factory has run, whatever its outcome.
    pub fn is_resolved(&self) -> bool {
        !matches!(self.state, State::Pending(_))
    }

    fn resolve(&mut self) -> Result<&mut (dyn Stream + 'static), StreamError> {
        if let State::Pending(_) = self.state
            && let State::Pending(factory) = mem::replace(&mut self.state, State::Failed(String::new()))
        {
            match factory() {
                Ok(stream) => {
                    trace!(?stream, "lazy stream resolved");
                    self.state = State::Ready(stream);
                }
                Err(e) => {
                    warn!(cause = %e, "unable to create lazy stream");
                    self.state = State::Failed(e.to_string());
                    return Err(e);
                }
            }
        }

        match &mut self.state {
            State::Ready(stream) => Ok(stream.as_mut()),
            State::Failed(reason) => Err(StreamError::unavailable(reason.as_str())),
            State::Pending(_) => Err(StreamError::unavailable("stream factory has not run")),
        }
    }
}

impl fmt::Debug for LazyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Pending(_) => f.write_str("LazyStream(<pending>)"),
            State::Ready(stream) => f.debug_tuple("LazyStream").field(stream).finish(),
            State::Failed(reason) => f.debug_struct("LazyStream").field("failed", reason).finish(),
        }
    }
}

impl Stream for LazyStream {
    fn close(&mut self) {
        if let Ok(stream) = self.resolve() {
            stream.close();
        }
    }

    fn detach(&mut self) -> Option<Resource> {
        self.resolve().ok()?.detach()
    }

    fn size(&mut self) -> Option<u64> {
        self.resolve().ok()?.size()
    }

    fn tell(&mut self) -> Result<u64, StreamError> {
        self.resolve()?.tell()
    }

    fn eof(&mut self) -> Result<bool, StreamError> {
        self.resolve()?.eof()
    }

    fn is_seekable(&mut self) -> bool {
        self.resolve().is_ok_and(|stream| stream.is_seekable())
    }

    fn seek(&mut self, position: SeekFrom) -> Result<(), StreamError> {
        self.resolve()?.seek(position)
    }

    fn rewind(&mut self) -> Result<(), StreamError> {
        self.resolve()?.rewind()
    }

    fn is_writable(&mut self) -> bool {
        self.resolve().is_ok_and(|stream| stream.is_writable())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize, StreamError> {
        self.resolve()?.write(bytes)
    }

    fn is_readable(&mut self) -> bool {
        self.resolve().is_ok_and(|stream| stream.is_readable())
    }

    fn read(&mut self, length: isize) -> Result<Bytes, StreamError> {
        self.resolve()?.read(length)
    }

    fn contents(&mut self) -> Result<Bytes, StreamError> {
        self.resolve()?.contents()
    }

    fn metadata(&mut self) -> Option<&StreamMetadata> {
        self.resolve().ok()?.metadata()
    }

    fn to_bytes(&mut self) -> Bytes {
        self.resolve().map(|stream| stream.to_bytes()).unwrap_or_default()
    }
}
