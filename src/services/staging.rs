//! Local scratch storage for uploads in flight.
//!
//! [`StagingArea::stage`] copies an upload stream to
//! `upload_dir/<16 hex chars><original extension>`. A partially written file
//! never survives a failed or cancelled copy. A successfully staged file is
//! handed to the caller, who wraps it in a [`StagedUpload`] guard that
//! removes it exactly once.

use crate::utils::file_type;
use rand::RngCore;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum StagingError {
    /// The upload stream itself failed (client abort, body over the limit).
    #[error("failed to read upload stream: {source}")]
    Read { source: std::io::Error },

    #[error("failed to create staged file {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write staged file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct StagedFile {
    pub generated_name: String,
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct StagingArea {
    upload_dir: PathBuf,
}

impl StagingArea {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub async fn stage<R>(&self, mut reader: R, original_name: &str) -> Result<StagedFile, StagingError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let generated_name = generate_unique_filename(original_name);
        let path = self.upload_dir.join(&generated_name);

        // Opened synchronously so no await sits between creating the file and
        // arming the guard; a dropped future can never leak an empty file.
        let file = std::fs::File::create(&path).map_err(|source| StagingError::Create {
            path: path.clone(),
            source,
        })?;
        let mut partial = PartialFile::new(path.clone());
        let mut file = tokio::fs::File::from_std(file);

        let copied = copy_to_file(&mut reader, &mut file, &path).await;

        match copied {
            Ok(size) => {
                partial.keep();
                tracing::debug!("📝 Staged {} ({} bytes) at {:?}", original_name, size, path);
                Ok(StagedFile {
                    generated_name,
                    path,
                    size,
                })
            }
            Err(e) => {
                drop(file);
                partial.remove().await;
                Err(e)
            }
        }
    }
}

async fn copy_to_file<R>(
    reader: &mut R,
    file: &mut tokio::fs::File,
    path: &Path,
) -> Result<u64, StagingError>
where
    R: AsyncRead + Unpin + Send,
{
    let write_err = |source: std::io::Error| StagingError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut size = 0u64;

    loop {
        let n = reader
            .read(&mut buf)
            .await
            .map_err(|source| StagingError::Read { source })?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).await.map_err(write_err)?;
        size += n as u64;
    }

    file.flush().await.map_err(write_err)?;
    Ok(size)
}

/// `hex(8 random bytes)` followed by the original extension.
pub fn generate_unique_filename(original: &str) -> String {
    let mut random_bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut random_bytes);
    format!(
        "{}{}",
        hex::encode(random_bytes),
        file_type::extension(original)
    )
}

struct PartialFile {
    path: Option<PathBuf>,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn keep(&mut self) {
        self.path = None;
    }

    async fn remove(&mut self) {
        if let Some(path) = self.path.take() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Failed to remove partial upload {:?}: {}", path, e),
            }
        }
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Owns a staged file for the lifetime of one upload request.
///
/// `release` removes the file; if the guard is dropped without being
/// released (early return, panic, client disconnect) `Drop` removes it.
#[derive(Debug)]
pub struct StagedUpload {
    staged: StagedFile,
    released: bool,
}

impl StagedUpload {
    pub fn new(staged: StagedFile) -> Self {
        Self {
            staged,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.staged.path
    }

    pub fn size(&self) -> u64 {
        self.staged.size
    }

    pub fn generated_name(&self) -> &str {
        &self.staged.generated_name
    }

    pub async fn release(mut self) {
        self.released = true;
        match tokio::fs::remove_file(&self.staged.path).await {
            Ok(()) => tracing::debug!("🧹 Removed staged file {:?}", self.staged.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "Failed to remove staged file {:?}: {}",
                self.staged.path,
                e
            ),
        }
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = std::fs::remove_file(&self.staged.path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        "Failed to remove staged file {:?} on drop: {}",
                        self.staged.path,
                        e
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    /// Yields some bytes, then fails like a dropped connection.
    struct BrokenReader {
        sent: bool,
    }

    impl AsyncRead for BrokenReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            if self.sent {
                Poll::Ready(Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "client went away",
                )))
            } else {
                self.sent = true;
                buf.put_slice(b"%PDF-1.7 partial");
                Poll::Ready(Ok(()))
            }
        }
    }

    #[test]
    fn test_generated_name_keeps_extension() {
        let name = generate_unique_filename("thesis.pdf");
        assert_eq!(name.len(), 16 + 4);
        assert!(name.ends_with(".pdf"));
        assert!(name[..16].chars().all(|c| c.is_ascii_hexdigit()));

        assert_eq!(generate_unique_filename("README").len(), 16);
        assert_ne!(
            generate_unique_filename("a.zip"),
            generate_unique_filename("a.zip")
        );
    }

    #[tokio::test]
    async fn test_stage_writes_full_stream() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path());

        let staged = area
            .stage(&b"hello capstone"[..], "notes.txt")
            .await
            .unwrap();

        assert_eq!(staged.size, 14);
        assert!(staged.generated_name.ends_with(".txt"));
        assert_eq!(std::fs::read(&staged.path).unwrap(), b"hello capstone");
    }

    #[tokio::test]
    async fn test_stage_removes_partial_file_on_stream_error() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path());

        let err = area
            .stage(BrokenReader { sent: false }, "thesis.pdf")
            .await
            .unwrap_err();

        assert!(matches!(err, StagingError::Read { .. }));
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_stage_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path().join("does-not-exist"));

        let err = area.stage(&b"data"[..], "code.zip").await.unwrap_err();
        assert!(matches!(err, StagingError::Create { .. }));
        assert!(!dir.path().join("does-not-exist").exists());
    }

    #[tokio::test]
    async fn test_cancelled_stage_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path());

        // The write half is never closed, so the copy parks after the first chunk.
        let (mut tx, rx) = tokio::io::duplex(64);
        tx.write_all(b"first chunk").await.unwrap();

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            area.stage(rx, "code.zip"),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_stage_dropped_after_first_poll_leaves_nothing() {
        use futures::FutureExt;

        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path());
        let (_tx, rx) = tokio::io::duplex(64);

        // Nothing is ever written, so the first poll parks inside the copy.
        assert!(area.stage(rx, "thesis.pdf").now_or_never().is_none());
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_guard_release_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path());
        let staged = area.stage(&b"zip bytes"[..], "code.zip").await.unwrap();

        let guard = StagedUpload::new(staged);
        assert_eq!(file_count(dir.path()), 1);
        guard.release().await;
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_guard_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path());
        let staged = area.stage(&b"zip bytes"[..], "code.zip").await.unwrap();

        {
            let _guard = StagedUpload::new(staged);
        }
        assert_eq!(file_count(dir.path()), 0);
    }
}
