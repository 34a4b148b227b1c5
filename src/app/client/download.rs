//! Tile download to disk with atomic writes
//!
//! The body is written to `<destination>.tmp` and renamed onto the
//! destination once complete, so a failed or interrupted fetch never leaves
//! a truncated tile where the merger would pick it up.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::app::client::http::HttpHandler;
use crate::constants::files;
use crate::errors::{DownloadError, DownloadResult};

/// File download operations handler
pub struct DownloadHandler<'a> {
    http_handler: &'a HttpHandler,
}

impl<'a> DownloadHandler<'a> {
    /// Creates a new DownloadHandler with the given HTTP handler
    pub fn new(http_handler: &'a HttpHandler) -> Self {
        Self { http_handler }
    }

    /// Download `url` into `destination`, overwriting it, and return the
    /// number of bytes written
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The HTTP request fails or returns a non-success status
    /// - The response body is empty
    /// - The destination cannot be written
    pub async fn download_file(&self, url: &Url, destination: &Path) -> DownloadResult<u64> {
        let temp_path = temp_path_for(destination);

        match self.download_file_attempt(url, &temp_path).await {
            Ok(size) => {
                commit_temp_file(&temp_path, destination).await?;
                tracing::debug!("Downloaded {} bytes to {}", size, destination.display());
                Ok(size)
            }
            Err(e) => {
                if temp_path.exists() {
                    let _ = tokio::fs::remove_file(&temp_path).await;
                }
                Err(e)
            }
        }
    }

    async fn download_file_attempt(&self, url: &Url, temp_path: &Path) -> DownloadResult<u64> {
        let response = self.http_handler.get_response(url).await?;

        let bytes = response.bytes().await.map_err(|source| DownloadError::Http {
            url: url.to_string(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(DownloadError::EmptyResponse {
                url: url.to_string(),
            });
        }

        let io_error = |source: std::io::Error| DownloadError::Io {
            path: temp_path.to_path_buf(),
            source,
        };
        let mut file = File::create(temp_path).await.map_err(io_error)?;
        file.write_all(&bytes).await.map_err(io_error)?;
        file.flush().await.map_err(io_error)?;

        Ok(bytes.len() as u64)
    }
}

/// Rename a finished temp file onto `destination`.
///
/// The temp file is not tracked by the cache manifest, so it is removed when
/// the rename fails.
pub async fn commit_temp_file(temp_path: &Path, destination: &Path) -> DownloadResult<()> {
    if let Err(source) = tokio::fs::rename(temp_path, destination).await {
        let _ = tokio::fs::remove_file(temp_path).await;
        return Err(DownloadError::AtomicOperationFailed {
            temp_path: temp_path.to_path_buf(),
            final_path: destination.to_path_buf(),
            source,
        });
    }
    Ok(())
}

/// Temporary sibling of `destination` used while a download is in flight
pub fn temp_path_for(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(files::TEMP_FILE_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_commit_renames_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("3-1.2.png");
        let temp_path = temp_path_for(&destination);
        std::fs::write(&temp_path, b"tile").unwrap();

        commit_temp_file(&temp_path, &destination).await.unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), b"tile");
        assert!(!temp_path.exists());
    }

    #[tokio::test]
    async fn test_failed_commit_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        // A non-empty directory in the way makes the rename fail
        let destination = temp_dir.path().join("3-1.2.png");
        std::fs::create_dir(&destination).unwrap();
        std::fs::write(destination.join("occupied"), b"x").unwrap();
        let temp_path = temp_path_for(&destination);
        std::fs::write(&temp_path, b"tile").unwrap();

        let result = commit_temp_file(&temp_path, &destination).await;

        match result {
            Err(e @ DownloadError::AtomicOperationFailed { .. }) => {
                assert!(e.source().is_some());
            }
            other => panic!("expected AtomicOperationFailed, got {:?}", other),
        }
        assert!(!temp_path.exists());
        assert!(destination.join("occupied").exists());
    }

    #[test]
    fn test_temp_file_path_generation() {
        let temp_path = temp_path_for(Path::new("/tmp/cache/12-1.2.png"));
        assert_eq!(temp_path, PathBuf::from("/tmp/cache/12-1.2.png.tmp"));
    }

    #[test]
    fn test_temp_file_path_no_extension() {
        let temp_path = temp_path_for(Path::new("/tmp/tile"));
        assert!(temp_path.to_string_lossy().ends_with("tile.tmp"));
    }
}
