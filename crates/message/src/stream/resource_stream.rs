use std::io::{self, Read, Seek, SeekFrom, Write};

use bytes::Bytes;
use tracing::warn;

use super::{OpenMode, Resource, Stream, StreamError, StreamMetadata};
use crate::ensure;

/// Upper bound of a single read from a resource without random access
const MAX_PARTIAL_READ: usize = 8192;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Status {
    Active,
    Closed,
    Detached,
}

/// A [`Stream`] owning a [`Resource`].
///
/// The size is taken from the metadata when present, otherwise the resource is
/// stat-ed on demand and the result is cached. Once a size is cached, writes keep it
/// up to date by adding the number of written bytes.
#[derive(Debug)]
pub struct ResourceStream {
    resource: Option<Resource>,
    status: Status,
    eof: bool,
    metadata: StreamMetadata,
}

impl ResourceStream {
    /// Wraps `resource`, trusting the capability flags of `metadata`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidResource`] if the handle does not refer to a live
    /// OS object.
    pub fn new(resource: Resource, metadata: StreamMetadata) -> Result<Self, StreamError> {
        resource.validate().map_err(StreamError::invalid_resource)?;
        Ok(Self { resource: Some(resource), status: Status::Active, eof: false, metadata })
    }

    /// Creates an empty, seekable, readable and writable in-memory stream.
    pub fn memory(metadata: StreamMetadata) -> Self {
        let defaults = StreamMetadata {
            mode: Some(OpenMode::READ_WRITE_TRUNCATE.to_owned()),
            seekable: true,
            readable: true,
            writable: true,
            ..Default::default()
        };
        Self { resource: Some(Resource::memory()), status: Status::Active, eof: false, metadata: metadata.merge(defaults) }
    }

    fn check_status(&self) -> Result<(), StreamError> {
        match self.status {
            Status::Active => Ok(()),
            Status::Closed => Err(StreamError::Closed),
            Status::Detached => Err(StreamError::Detached),
        }
    }

    fn resource(&mut self) -> Result<&mut Resource, StreamError> {
        self.check_status()?;
        self.resource.as_mut().ok_or(StreamError::Detached)
    }
}

fn read_once(resource: &mut Resource, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match resource.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            result => return result,
        }
    }
}

impl Stream for ResourceStream {
    fn close(&mut self) {
        if self.status == Status::Active {
            drop(self.resource.take());
        }
        self.status = Status::Closed;
        self.detach();
    }

    fn detach(&mut self) -> Option<Resource> {
        if self.status == Status::Detached {
            return None;
        }
        self.status = Status::Detached;
        self.resource.take()
    }

    fn size(&mut self) -> Option<u64> {
        if let Some(size) = self.metadata.size {
            return Some(size);
        }
        if self.status != Status::Active {
            return None;
        }
        let size = self.resource.as_ref()?.stat();
        self.metadata.size = size;
        size
    }

    fn tell(&mut self) -> Result<u64, StreamError> {
        self.resource()?.stream_position().map_err(|source| StreamError::Tell { source })
    }

    fn eof(&mut self) -> Result<bool, StreamError> {
        self.check_status()?;
        Ok(self.eof)
    }

    fn is_seekable(&mut self) -> bool {
        self.metadata.seekable
    }

    fn seek(&mut self, position: SeekFrom) -> Result<(), StreamError> {
        self.check_status()?;
        ensure!(self.metadata.seekable, StreamError::NotSeekable);

        self.resource()?
            .seek(position)
            .map_err(|source| StreamError::Seek { position: format!("{position:?}"), source })?;
        self.eof = false;
        Ok(())
    }

    fn is_writable(&mut self) -> bool {
        self.metadata.writable
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize, StreamError> {
        self.check_status()?;
        ensure!(self.metadata.writable, StreamError::NotWritable);

        self.resource()?.write_all(bytes).map_err(|source| StreamError::Write { source })?;

        if let Some(size) = self.metadata.size {
            self.metadata.size = Some(size + bytes.len() as u64);
        }
        Ok(bytes.len())
    }

    fn is_readable(&mut self) -> bool {
        self.metadata.readable
    }

    fn read(&mut self, length: isize) -> Result<Bytes, StreamError> {
        self.check_status()?;
        ensure!(self.metadata.readable, StreamError::NotReadable);

        let Ok(length) = u64::try_from(length) else {
            return Err(StreamError::NegativeLength(length));
        };
        if length == 0 {
            return Ok(Bytes::new());
        }

        let resource = self.resource()?;
        if resource.is_seekable() {
            let mut buf = Vec::new();
            let read = resource.take(length).read_to_end(&mut buf).map_err(|source| StreamError::Read { source })?;
            self.eof = (read as u64) < length;
            return Ok(Bytes::from(buf));
        }

        // pipes and terminals return what is available instead of waiting for `length` bytes
        let capacity = usize::try_from(length).map_or(MAX_PARTIAL_READ, |length| length.min(MAX_PARTIAL_READ));
        let mut buf = vec![0; capacity];
        let read = read_once(resource, &mut buf).map_err(|source| StreamError::Read { source })?;
        buf.truncate(read);
        self.eof = read == 0;
        Ok(Bytes::from(buf))
    }

    fn contents(&mut self) -> Result<Bytes, StreamError> {
        self.check_status()?;
        ensure!(self.metadata.readable, StreamError::NotReadable);

        let mut buf = Vec::new();
        let result = self.resource()?.read_to_end(&mut buf);
        if let Err(source) = result {
            warn!(cause = %source, uri = ?self.metadata.uri, "unable to read stream contents");
            return Err(StreamError::Contents { source });
        }
        self.eof = true;
        Ok(Bytes::from(buf))
    }

    fn metadata(&mut self) -> Option<&StreamMetadata> {
        Some(&self.metadata)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::OpenOptions;

    use super::*;

    fn memory_with(content: &[u8]) -> ResourceStream {
        let mut stream = ResourceStream::memory(StreamMetadata::default());
        stream.write(content).unwrap();
        stream.rewind().unwrap();
        stream
    }

    #[test]
    fn read_and_write() {
        let mut stream = memory_with(b"hello world");

        assert_eq!(stream.read(5).unwrap(), Bytes::from_static(b"hello"));
        assert_eq!(stream.tell().unwrap(), 5);
        assert!(!stream.eof().unwrap());
        assert_eq!(stream.contents().unwrap(), Bytes::from_static(b" world"));
        assert!(stream.eof().unwrap());

        stream.rewind().unwrap();
        assert!(!stream.eof().unwrap());
        assert_eq!(stream.read(100).unwrap(), Bytes::from_static(b"hello world"));
        assert!(stream.eof().unwrap());
    }

    #[test]
    fn negative_and_zero_length() {
        let mut stream = memory_with(b"abc");

        assert!(matches!(stream.read(-1), Err(StreamError::NegativeLength(-1))));
        assert_eq!(stream.read(0).unwrap(), Bytes::new());
        assert_eq!(stream.tell().unwrap(), 0);
    }

    #[test]
    fn zero_length_read_does_not_touch_resource() {
        // stdout can not be read from, a real read would fail
        let metadata = StreamMetadata { readable: true, ..Default::default() };
        let mut stream = ResourceStream::new(Resource::Stdout(std::io::stdout()), metadata).unwrap();

        assert_eq!(stream.read(0).unwrap(), Bytes::new());
        assert!(matches!(stream.read(1), Err(StreamError::Read { .. })));
    }

    #[test]
    fn close_is_idempotent() {
        let mut stream = memory_with(b"abc");

        stream.close();
        stream.close();

        assert!(matches!(stream.read(1), Err(StreamError::Detached)));
        assert!(matches!(stream.write(b"x"), Err(StreamError::Detached)));
        assert!(matches!(stream.seek(SeekFrom::Start(0)), Err(StreamError::Detached)));
        assert!(matches!(stream.tell(), Err(StreamError::Detached)));
        assert!(matches!(stream.eof(), Err(StreamError::Detached)));
        assert!(matches!(stream.contents(), Err(StreamError::Detached)));
        assert!(stream.detach().is_none());
        assert_eq!(stream.to_bytes(), Bytes::new());
    }

    #[test]
    fn detach_returns_resource_once() {
        let mut stream = memory_with(b"abc");

        let resource = stream.detach();
        assert!(matches!(resource, Some(Resource::Memory(_))));
        assert!(stream.detach().is_none());
        assert!(stream.read(1).unwrap_err().is_state_error());
        assert_eq!(stream.size(), None);
    }

    #[test]
    fn capability_checks() {
        let metadata = StreamMetadata { readable: false, writable: false, seekable: false, ..Default::default() };
        let mut stream = ResourceStream::new(Resource::memory(), metadata).unwrap();

        assert!(matches!(stream.read(1), Err(StreamError::NotReadable)));
        assert!(matches!(stream.contents(), Err(StreamError::NotReadable)));
        assert!(matches!(stream.write(b"x"), Err(StreamError::NotWritable)));
        assert!(matches!(stream.rewind(), Err(StreamError::NotSeekable)));
        assert!(stream.write(b"x").unwrap_err().is_capability_error());
    }

    #[test]
    fn state_is_checked_before_capability() {
        let metadata = StreamMetadata { readable: false, ..Default::default() };
        let mut stream = ResourceStream::new(Resource::memory(), metadata).unwrap();
        stream.close();

        assert!(matches!(stream.read(1), Err(StreamError::Detached)));
    }

    #[test]
    fn size_is_bumped_only_once_cached() {
        let mut stream = ResourceStream::memory(StreamMetadata::default());

        // nothing cached yet, the write leaves the size alone
        stream.write(b"abc").unwrap();
        assert_eq!(stream.metadata().unwrap().size, None);

        // first query stats the buffer and caches
        assert_eq!(stream.size(), Some(3));

        // from now on writes bump the cached value
        stream.write(b"de").unwrap();
        assert_eq!(stream.metadata().unwrap().size, Some(5));
        assert_eq!(stream.size(), Some(5));
    }

    #[test]
    fn declared_size_wins() {
        let metadata = StreamMetadata { size: Some(42), ..Default::default() };
        let mut stream = ResourceStream::new(Resource::memory(), metadata).unwrap();

        assert_eq!(stream.size(), Some(42));
    }

    #[test]
    fn file_resource() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"from disk").unwrap();

        let handle = OpenOptions::new().read(true).open(file.path()).unwrap();
        let metadata = StreamMetadata {
            uri: Some(file.path().display().to_string()),
            readable: true,
            seekable: true,
            ..Default::default()
        };
        let mut stream = ResourceStream::new(Resource::File(handle), metadata).unwrap();

        assert_eq!(stream.size(), Some(9));
        assert_eq!(stream.to_bytes(), Bytes::from_static(b"from disk"));
        assert_eq!(stream.to_bytes(), Bytes::from_static(b"from disk"));
        assert!(matches!(stream.write(b"x"), Err(StreamError::NotWritable)));
    }

    #[cfg(unix)]
    #[test]
    fn pipe_read_returns_available_bytes() {
        use std::fs::File;
        use std::os::fd::OwnedFd;

        let (reader, mut writer) = std::io::pipe().unwrap();
        writer.write_all(b"abc").unwrap();

        let metadata = StreamMetadata { readable: true, ..Default::default() };
        let mut stream = ResourceStream::new(Resource::File(File::from(OwnedFd::from(reader))), metadata).unwrap();

        assert_eq!(stream.read(100).unwrap(), Bytes::from_static(b"abc"));
        assert!(!stream.eof().unwrap());

        drop(writer);
        assert_eq!(stream.read(100).unwrap(), Bytes::new());
        assert!(stream.eof().unwrap());
    }

    #[test]
    fn to_bytes_without_seek() {
        let mut stream = memory_with(b"abcdef");
        stream.read(3).unwrap();

        stream.metadata.seekable = false;
        assert_eq!(stream.to_bytes(), Bytes::from_static(b"def"));
    }
}
