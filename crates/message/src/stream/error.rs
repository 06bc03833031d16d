use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("stream must be a valid resource: {source}")]
    InvalidResource {
        #[source]
        source: io::Error,
    },

    #[error("stream is closed")]
    Closed,

    #[error("stream is detached")]
    Detached,

    #[error("stream is not seekable")]
    NotSeekable,

    #[error("cannot read from non-readable stream")]
    NotReadable,

    #[error("cannot write to a non-writable stream")]
    NotWritable,

    #[error("length parameter cannot be negative: {0}")]
    NegativeLength(isize),

    #[error("unable to determine stream position: {source}")]
    Tell {
        #[source]
        source: io::Error,
    },

    #[error("unable to seek to stream position {position}: {source}")]
    Seek {
        position: String,
        #[source]
        source: io::Error,
    },

    #[error("unable to read from stream: {source}")]
    Read {
        #[source]
        source: io::Error,
    },

    #[error("unable to write to stream: {source}")]
    Write {
        #[source]
        source: io::Error,
    },

    #[error("unable to read stream contents: {source}")]
    Contents {
        #[source]
        source: io::Error,
    },

    #[error("invalid open mode: {0:?}")]
    InvalidMode(String),

    #[error("unable to open {path:?} using mode {mode:?}: {source}")]
    Open {
        path: String,
        mode: String,
        #[source]
        source: io::Error,
    },

    #[error("stream is unavailable: {reason}")]
    Unavailable { reason: String },
}

impl StreamError {
    pub fn invalid_resource<E: Into<io::Error>>(e: E) -> Self {
        Self::InvalidResource { source: e.into() }
    }

    pub fn unavailable<S: ToString>(str: S) -> Self {
        Self::Unavailable { reason: str.to_string() }
    }

    /// Returns true for the errors raised because the stream left the active state.
    #[cfg(test)]
    pub(crate) fn is_state_error(&self) -> bool {
        matches!(self, StreamError::Closed | StreamError::Detached)
    }

    /// Returns true for the errors raised because the stream lacks a capability.
    #[cfg(test)]
    pub(crate) fn is_capability_error(&self) -> bool {
        matches!(self, StreamError::NotSeekable | StreamError::NotReadable | StreamError::NotWritable)
    }
}
