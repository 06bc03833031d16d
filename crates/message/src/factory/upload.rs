use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::DefaultStreamFactory;
use crate::message::{Body, UploadErrorCode, UploadMover, UploadedFile, UploadedFileParts};
use crate::stream::{OpenMode, StreamMetadata};

const BUFFER_SIZE: isize = 8192;

/// Creates [`UploadedFile`]s sharing one [`UploadMover`].
#[derive(Debug, Clone)]
pub struct UploadedFileFactory {
    mover: Arc<dyn UploadMover>,
}

impl Default for UploadedFileFactory {
    fn default() -> Self {
        Self::new(Arc::new(FsUploadMover::default()))
    }
}

impl UploadedFileFactory {
    pub fn new(mover: Arc<dyn UploadMover>) -> Self {
        Self { mover }
    }

    pub fn create_uploaded_file(
        &self,
        stream: Body,
        size: Option<u64>,
        error: UploadErrorCode,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> UploadedFile {
        UploadedFile::from_parts(UploadedFileParts {
            mover: Arc::clone(&self.mover),
            stream,
            size,
            error,
            client_filename,
            client_media_type,
        })
    }
}

/// Moves uploads on the local filesystem.
///
/// Any existing regular file counts as an upload. The content is copied through the
/// stream api into the truncated target, then the source file is removed.
#[derive(Debug, Default, Clone)]
pub struct FsUploadMover {
    streams: DefaultStreamFactory,
}

impl UploadMover for FsUploadMover {
    fn is_uploaded_file(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn move_file(&self, source: &Body, target: &Path) -> Result<(), Box<dyn Error + Send + Sync>> {
        let source_path = source.uri().ok_or("uploaded stream has no uri")?;
        let target_body = self.streams.create_stream_from_file(target, OpenMode::WRITE_TRUNCATE, StreamMetadata::default())?;

        {
            let mut origin = source.lock();
            let mut destination = target_body.lock();

            if origin.is_seekable() {
                origin.rewind()?;
            }
            while !origin.eof()? {
                let chunk = origin.read(BUFFER_SIZE)?;
                if destination.write(&chunk)? == 0 {
                    break;
                }
            }

            origin.close();
            destination.close();
        }

        fs::remove_file(&source_path).map_err(|e| format!("cannot delete file {source_path}: {e}"))?;
        debug!(from = %source_path, to = %target.display(), "moved uploaded file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::UploadError;

    #[test]
    fn move_uploaded_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("upload-tmp");
        let target = dir.path().join("stored.bin");
        let content: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&source, &content).unwrap();

        let stream = DefaultStreamFactory.create_stream_from_file(&source, "r", StreamMetadata::default()).unwrap();
        let file = UploadedFileFactory::default().create_uploaded_file(stream, None, UploadErrorCode::Ok, None, None);

        file.move_to(&target).unwrap();

        assert_eq!(fs::read(&target).unwrap(), content);
        assert!(!source.exists());
        assert!(file.stream().lock().read(1).unwrap_err().is_state_error());
    }

    #[test]
    fn missing_file_is_not_an_upload() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("gone");

        let stream = DefaultStreamFactory.create_stream_from_file(&source, "r", StreamMetadata::default()).unwrap();
        let file = UploadedFileFactory::default().create_uploaded_file(stream, None, UploadErrorCode::Ok, None, None);

        // the lazy stream fails to open, so it has no uri to check
        let err = file.move_to(dir.path().join("target")).unwrap_err();
        assert!(matches!(err, UploadError::NotUploaded(_)));
        assert!(!FsUploadMover::default().is_uploaded_file(&source.display().to_string()));
    }

    #[test]
    fn in_memory_stream_can_not_be_moved() {
        let dir = tempfile::tempdir().unwrap();
        let mover = FsUploadMover::default();

        let result = mover.move_file(&Body::empty(), &dir.path().join("target"));
        assert_eq!(result.unwrap_err().to_string(), "uploaded stream has no uri");
    }
}
