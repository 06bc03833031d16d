use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Stderr, Stdin, Stdout, Write};

/// An OS level byte resource a stream can wrap.
#[derive(Debug)]
pub enum Resource {
    /// An opened file
    File(File),
    /// A growable in-memory buffer
    Memory(Cursor<Vec<u8>>),
    /// The process standard input, read only
    Stdin(Stdin),
    /// The process standard output, write only
    Stdout(Stdout),
    /// The process standard error, write only
    Stderr(Stderr),
}

impl Resource {
    /// Creates an empty in-memory resource.
    pub fn memory() -> Self {
        Resource::Memory(Cursor::new(Vec::new()))
    }

    /// Checks that the handle refers to a live OS object.
    pub(crate) fn validate(&self) -> io::Result<()> {
        match self {
            Resource::File(file) => file.metadata().map(|_| ()),
            Resource::Memory(_) | Resource::Stdin(_) | Resource::Stdout(_) | Resource::Stderr(_) => Ok(()),
        }
    }

    /// Returns the current size of the resource, `None` if it can not be determined.
    pub(crate) fn stat(&self) -> Option<u64> {
        match self {
            Resource::File(file) => file.metadata().ok().map(|metadata| metadata.len()),
            Resource::Memory(cursor) => Some(cursor.get_ref().len() as u64),
            Resource::Stdin(_) | Resource::Stdout(_) | Resource::Stderr(_) => None,
        }
    }

    /// Returns true if the resource supports random access.
    pub(crate) fn is_seekable(&self) -> bool {
        match self {
            Resource::File(file) => file.metadata().is_ok_and(|metadata| metadata.is_file()),
            Resource::Memory(_) => true,
            Resource::Stdin(_) | Resource::Stdout(_) | Resource::Stderr(_) => false,
        }
    }
}

fn unsupported(operation: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, format!("{operation} is not supported by this resource"))
}

impl Read for Resource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Resource::File(file) => file.read(buf),
            Resource::Memory(cursor) => cursor.read(buf),
            Resource::Stdin(stdin) => stdin.read(buf),
            Resource::Stdout(_) | Resource::Stderr(_) => Err(unsupported("read")),
        }
    }
}

impl Write for Resource {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Resource::File(file) => file.write(buf),
            Resource::Memory(cursor) => cursor.write(buf),
            Resource::Stdout(stdout) => stdout.write(buf),
            Resource::Stderr(stderr) => stderr.write(buf),
            Resource::Stdin(_) => Err(unsupported("write")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Resource::File(file) => file.flush(),
            Resource::Memory(cursor) => cursor.flush(),
            Resource::Stdout(stdout) => stdout.flush(),
            Resource::Stderr(stderr) => stderr.flush(),
            Resource::Stdin(_) => Ok(()),
        }
    }
}

impl Seek for Resource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Resource::File(file) => file.seek(pos),
            Resource::Memory(cursor) => cursor.seek(pos),
            Resource::Stdin(_) | Resource::Stdout(_) | Resource::Stderr(_) => Err(unsupported("seek")),
        }
    }
}

impl From<File> for Resource {
    fn from(file: File) -> Self {
        Resource::File(file)
    }
}

impl From<Vec<u8>> for Resource {
    fn from(bytes: Vec<u8>) -> Self {
        Resource::Memory(Cursor::new(bytes))
    }
}
