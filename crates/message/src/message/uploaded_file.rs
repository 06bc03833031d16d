use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::{Body, UploadError};

/// Moves uploaded files out of their temporary location.
pub trait UploadMover: fmt::Debug + Send + Sync {
    /// Returns true if `path` names a file received through an upload.
    fn is_uploaded_file(&self, path: &str) -> bool;

    /// Moves the content of `source` to `target`.
    fn move_file(&self, source: &Body, target: &Path) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// The status of a file upload, numbered like the classic CGI upload codes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum UploadErrorCode {
    #[default]
    Ok = 0,
    /// The file exceeds the server wide size limit
    IniSize = 1,
    /// The file exceeds the size limit of the form
    FormSize = 2,
    Partial = 3,
    NoFile = 4,
    NoTmpDir = 6,
    CantWrite = 7,
    /// An extension stopped the upload
    Extension = 8,
}

impl UploadErrorCode {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::IniSize),
            2 => Some(Self::FormSize),
            3 => Some(Self::Partial),
            4 => Some(Self::NoFile),
            6 => Some(Self::NoTmpDir),
            7 => Some(Self::CantWrite),
            8 => Some(Self::Extension),
            _ => None,
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// The parts of an uploaded file.
#[derive(Debug, Clone)]
pub struct UploadedFileParts {
    pub mover: Arc<dyn UploadMover>,
    pub stream: Body,
    /// Declared size, the live stream size is used when unset
    pub size: Option<u64>,
    pub error: UploadErrorCode,
    pub client_filename: Option<String>,
    pub client_media_type: Option<String>,
}

impl UploadedFileParts {
    pub fn new(mover: Arc<dyn UploadMover>, stream: Body) -> Self {
        Self { mover, stream, size: None, error: UploadErrorCode::Ok, client_filename: None, client_media_type: None }
    }
}

/// An immutable handle to a file received with a request.
///
/// Two handles are equal only if they were cloned from one another.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    inner: triomphe::Arc<UploadedFileParts>,
}

impl UploadedFile {
    pub fn new(mover: Arc<dyn UploadMover>, stream: Body) -> Self {
        Self::from_parts(UploadedFileParts::new(mover, stream))
    }

    pub fn from_parts(parts: UploadedFileParts) -> Self {
        Self { inner: triomphe::Arc::new(parts) }
    }

    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        triomphe::Arc::ptr_eq(&this.inner, &other.inner)
    }

    pub fn stream(&self) -> &Body {
        &self.inner.stream
    }

    pub fn size(&self) -> Option<u64> {
        self.inner.size.or_else(|| self.inner.stream.size())
    }

    pub fn error(&self) -> UploadErrorCode {
        self.inner.error
    }

    /// Returns the declared client filename, or the uri of the stream.
    pub fn client_filename(&self) -> Option<String> {
        self.inner.client_filename.clone().or_else(|| self.inner.stream.uri())
    }

    /// Returns the declared client media type, or the media type of the stream.
    pub fn client_media_type(&self) -> Option<String> {
        self.inner.client_media_type.clone().or_else(|| {
            self.inner.stream.metadata().and_then(|metadata| metadata.media_type).map(|mime| mime.to_string())
        })
    }

    /// Moves the uploaded file to `target` through the mover.
    ///
    /// # Errors
    ///
    /// - [`UploadError::NotUploaded`] if the mover does not recognize the stream uri
    /// - [`UploadError::Move`] if the move itself fails
    pub fn move_to<P: AsRef<Path>>(&self, target: P) -> Result<(), UploadError> {
        let uploaded = self.inner.stream.uri().unwrap_or_default();
        if !self.inner.mover.is_uploaded_file(&uploaded) {
            return Err(UploadError::NotUploaded(uploaded));
        }

        self.inner.mover.move_file(&self.inner.stream, target.as_ref()).map_err(|source| UploadError::Move { source })
    }
}

impl PartialEq for UploadedFile {
    fn eq(&self, other: &Self) -> bool {
        UploadedFile::ptr_eq(self, other)
    }
}

/// Uploaded files, nested the way the form fields were.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadedFileTree {
    File(UploadedFile),
    Nested(BTreeMap<String, UploadedFileTree>),
}

impl UploadedFileTree {
    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            UploadedFileTree::File(file) => Some(file),
            UploadedFileTree::Nested(_) => None,
        }
    }

    /// Returns the subtree stored under `key` of a nested node.
    pub fn get(&self, key: &str) -> Option<&UploadedFileTree> {
        match self {
            UploadedFileTree::File(_) => None,
            UploadedFileTree::Nested(children) => children.get(key),
        }
    }
}
