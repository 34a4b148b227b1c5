//! Run-scoped record of cached tile files
//!
//! Every tile written during a run is recorded here so the run can remove
//! exactly the files it created, whether it completes, fails or is
//! cancelled. Files already present in the cache root from other runs are
//! never touched.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::geo::TileIndex;

/// One tile file written during the current run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedTile {
    /// Tile position in the grid
    pub index: TileIndex,
    /// Location of the tile image on disk
    pub path: PathBuf,
    /// Bytes written
    pub size: u64,
    /// Wall time spent fetching the tile
    pub elapsed: Duration,
}

/// Outcome of a best-effort purge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeReport {
    /// Files removed
    pub removed: usize,
    /// Files that could not be removed (already gone, in use, ...)
    pub failed: usize,
}

/// Append-only list of tiles cached by the current run
#[derive(Debug, Default, Clone)]
pub struct CacheManifest {
    tiles: Vec<CachedTile>,
}

impl CacheManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tile that has been written to disk
    pub fn record(&mut self, tile: CachedTile) {
        debug!(tile = %tile.index, path = %tile.path.display(), "Recorded cached tile");
        self.tiles.push(tile);
    }

    /// Tiles recorded so far, in fetch order
    pub fn tiles(&self) -> &[CachedTile] {
        &self.tiles
    }

    /// Paths recorded so far, in fetch order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.tiles.iter().map(|tile| tile.path.as_path())
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Total bytes of all recorded tiles
    pub fn total_bytes(&self) -> u64 {
        self.tiles.iter().map(|tile| tile.size).sum()
    }

    /// Remove every recorded file.
    ///
    /// Removal failures are counted and logged at debug level, never
    /// returned. The manifest itself is left untouched, so calling this
    /// twice simply reports the second round as failures.
    pub fn purge_all(&self) -> PurgeReport {
        let mut report = PurgeReport::default();

        for path in self.paths() {
            match std::fs::remove_file(path) {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    debug!("Could not remove cached tile {}: {}", path.display(), e);
                    report.failed += 1;
                }
            }
        }

        debug!(
            removed = report.removed,
            failed = report.failed,
            "Purged cached tiles"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn cached_tile(dir: &Path, x: u32, y: u32, size: u64) -> CachedTile {
        let path = dir.join(format!("1-{}.{}.png", x, y));
        std::fs::write(&path, vec![0_u8; size as usize]).unwrap();
        CachedTile {
            index: TileIndex::new(x, y),
            path,
            size,
            elapsed: Duration::from_millis(20),
        }
    }

    #[test]
    fn test_record_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut manifest = CacheManifest::new();
        manifest.record(cached_tile(temp_dir.path(), 0, 1, 10));
        manifest.record(cached_tile(temp_dir.path(), 0, 0, 20));

        let indices: Vec<_> = manifest.tiles().iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![TileIndex::new(0, 1), TileIndex::new(0, 0)]);
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.total_bytes(), 30);
    }

    #[test]
    fn test_purge_removes_only_recorded_files() {
        let temp_dir = TempDir::new().unwrap();
        let unrelated = temp_dir.path().join("keep-me.png");
        std::fs::write(&unrelated, b"other run").unwrap();

        let mut manifest = CacheManifest::new();
        manifest.record(cached_tile(temp_dir.path(), 1, 1, 5));
        manifest.record(cached_tile(temp_dir.path(), 1, 2, 5));

        let report = manifest.purge_all();
        assert_eq!(report, PurgeReport { removed: 2, failed: 0 });
        assert!(manifest.paths().all(|p| !p.exists()));
        assert!(unrelated.exists());
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn test_purge_tolerates_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut manifest = CacheManifest::new();
        let tile = cached_tile(temp_dir.path(), 2, 2, 5);
        std::fs::remove_file(&tile.path).unwrap();
        manifest.record(tile);
        manifest.record(cached_tile(temp_dir.path(), 2, 3, 5));

        let report = manifest.purge_all();
        assert_eq!(report, PurgeReport { removed: 1, failed: 1 });
    }

    #[test]
    fn test_empty_manifest_purge() {
        let manifest = CacheManifest::new();
        assert!(manifest.is_empty());
        assert_eq!(manifest.purge_all(), PurgeReport::default());
    }
}
