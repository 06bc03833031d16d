use std::io;
use std::path::Path;

use bytes::Bytes;
use tracing::trace;

use crate::ensure;
use crate::message::Body;
use crate::stream::{LazyStream, OpenMode, Resource, ResourceStream, Stream, StreamError, StreamMetadata};

/// Creates the streams carrying message bodies.
pub trait StreamFactory {
    /// Creates a stream holding `content`, positioned at its beginning.
    fn create_stream(&self, content: Bytes, metadata: StreamMetadata) -> Body;
}

/// Creates lazily opened streams over memory, files and the standard io handles.
///
/// Nothing is opened before the first access to the returned body, open failures
/// surface from that first access.
#[derive(Debug, Default, Copy, Clone)]
pub struct DefaultStreamFactory;

impl StreamFactory for DefaultStreamFactory {
    fn create_stream(&self, content: Bytes, metadata: StreamMetadata) -> Body {
        Body::new(LazyStream::new(move || {
            let mut stream = ResourceStream::memory(metadata);
            stream.write(&content)?;
            stream.rewind()?;
            Ok(stream)
        }))
    }
}

impl DefaultStreamFactory {
    /// Creates a stream over the file at `path` opened with an `fopen` style `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidMode`] right away for an unknown mode. Failing to
    /// open the file is reported as [`StreamError::Open`] by the first stream operation.
    pub fn create_stream_from_file<P: AsRef<Path>>(
        &self,
        path: P,
        mode: &str,
        metadata: StreamMetadata,
    ) -> Result<Body, StreamError> {
        let mode = OpenMode::parse(mode)?;
        let path = path.as_ref().to_path_buf();
        Ok(Body::new(LazyStream::new(move || open_file(&path, mode, metadata))))
    }

    /// Wraps an already opened resource.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::NotReadable`] if the resource can not be read from, and
    /// [`StreamError::InvalidResource`] if it is not a live handle.
    pub fn create_stream_from_resource(&self, resource: Resource, metadata: StreamMetadata) -> Result<Body, StreamError> {
        let metadata = metadata.merge(resource_defaults(&resource));
        ensure!(metadata.readable, StreamError::NotReadable);
        Ok(Body::new(ResourceStream::new(resource, metadata)?))
    }

    /// Creates an empty, growable in-memory stream.
    pub fn create_in_memory_stream(&self, metadata: StreamMetadata) -> Body {
        Body::new(LazyStream::new(move || Ok::<_, StreamError>(ResourceStream::memory(metadata))))
    }

    /// Creates a stream over an anonymous temporary file, removed once closed.
    pub fn create_temp_file_stream(&self, metadata: StreamMetadata) -> Body {
        Body::new(LazyStream::new(move || {
            let file = tempfile::tempfile().map_err(|source| StreamError::Open {
                path: "<temporary file>".to_owned(),
                mode: OpenMode::READ_WRITE_TRUNCATE.to_owned(),
                source,
            })?;
            let mut defaults = StreamMetadata::for_mode(OpenMode::parse(OpenMode::READ_WRITE_TRUNCATE)?);
            defaults.seekable = true;
            ResourceStream::new(Resource::File(file), metadata.merge(defaults))
        }))
    }

    pub fn create_stdin_stream(&self, metadata: StreamMetadata) -> Body {
        Body::new(LazyStream::new(move || std_stream(Resource::Stdin(io::stdin()), OpenMode::READ_EXISTING, metadata)))
    }

    pub fn create_stdout_stream(&self, metadata: StreamMetadata) -> Body {
        Body::new(LazyStream::new(move || std_stream(Resource::Stdout(io::stdout()), OpenMode::WRITE_TRUNCATE, metadata)))
    }

    pub fn create_stderr_stream(&self, metadata: StreamMetadata) -> Body {
        Body::new(LazyStream::new(move || std_stream(Resource::Stderr(io::stderr()), OpenMode::WRITE_TRUNCATE, metadata)))
    }

    /// Creates the stream an incoming CGI request body is read from, the standard input.
    pub fn create_request_body_stream(&self) -> Body {
        self.create_stdin_stream(StreamMetadata::default())
    }
}

fn open_file(path: &Path, mode: OpenMode, metadata: StreamMetadata) -> Result<ResourceStream, StreamError> {
    trace!(path = %path.display(), %mode, "opening file stream");
    let file = mode.open_options().open(path).map_err(|source| StreamError::Open {
        path: path.display().to_string(),
        mode: mode.to_string(),
        source,
    })?;
    let resource = Resource::File(file);

    let mut defaults = StreamMetadata::for_mode(mode);
    defaults.uri = Some(path.display().to_string());
    defaults.seekable = resource.is_seekable();

    let metadata = StreamMetadata { readable: mode.is_readable(), writable: mode.is_writable(), ..metadata.merge(defaults) };
    ResourceStream::new(resource, metadata)
}

fn std_stream(resource: Resource, mode: &str, metadata: StreamMetadata) -> Result<ResourceStream, StreamError> {
    let mode = OpenMode::parse(mode)?;
    let metadata = StreamMetadata { readable: mode.is_readable(), writable: mode.is_writable(), ..metadata.merge(resource_defaults(&resource)) };
    ResourceStream::new(resource, metadata)
}

fn resource_defaults(resource: &Resource) -> StreamMetadata {
    let (mode, readable, writable) = match resource {
        Resource::File(_) => (OpenMode::READ_WRITE_EXISTING, true, true),
        Resource::Memory(_) => (OpenMode::READ_WRITE_TRUNCATE, true, true),
        Resource::Stdin(_) => (OpenMode::READ_EXISTING, true, false),
        Resource::Stdout(_) | Resource::Stderr(_) => (OpenMode::WRITE_TRUNCATE, false, true),
    };
    StreamMetadata {
        mode: Some(mode.to_owned()),
        seekable: resource.is_seekable(),
        readable,
        writable,
        ..Default::default()
    }
}
