//! Tile cache: file naming and run lifecycle
//!
//! - [`path`] maps a tile to its file in the cache root
//! - [`manifest`] records the files a run wrote and purges them
//!
//! The cache root itself is created on demand with [`ensure_cache_dir`].

pub mod manifest;
pub mod path;

use std::path::Path;

use tracing::debug;

use crate::errors::{CacheError, CacheResult};

pub use manifest::{CacheManifest, CachedTile, PurgeReport};
pub use path::{tile_cache_path, tile_file_name};

/// Create the cache directory and any missing parents
pub async fn ensure_cache_dir(cache_root: &Path) -> CacheResult<()> {
    if cache_root.as_os_str().is_empty() {
        return Ok(());
    }

    tokio::fs::create_dir_all(cache_root)
        .await
        .map_err(|source| CacheError::DirectoryNotAccessible {
            path: cache_root.to_path_buf(),
            source,
        })?;
    debug!("Cache directory ready: {}", cache_root.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_ensure_cache_dir_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b").join("tiles");

        ensure_cache_dir(&nested).await.unwrap();
        assert!(nested.is_dir());

        // Idempotent
        ensure_cache_dir(&nested).await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_cache_dir_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let result = ensure_cache_dir(&file.join("tiles")).await;
        match result {
            Err(CacheError::DirectoryNotAccessible { path, .. }) => {
                assert!(path.ends_with("tiles"));
            }
            other => panic!("Expected DirectoryNotAccessible, got {:?}", other),
        }
    }
}
