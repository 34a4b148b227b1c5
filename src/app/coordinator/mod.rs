//! Run orchestration: fetch, merge, purge
//!
//! The coordinator drives one run from a [`RunConfig`]:
//!
//! 1. transform the bounding box into a tile rectangle
//! 2. fetch every tile into the cache, x outer and y inner, recording each
//!    success in the run's [`CacheManifest`]
//! 3. merge the cached grid into the mosaic
//! 4. purge the recorded tiles unless the cache is kept
//!
//! Fetching is strictly sequential. A shutdown request is checked between
//! tile fetches and once more before the merge; when one is seen the run
//! purges (unless kept) and returns [`SessionStatus::Cancelled`]. Any fatal
//! error also purges (unless kept) before it is returned, and no mosaic is
//! written after a failed tile.
//!
//! # Architecture
//!
//! - [`config`] - run parameters
//! - [`stats`] - fetch statistics and session results
//! - [`progress`] - progress events for the CLI
//! - [`signals`] - Ctrl-C/SIGTERM to shutdown broadcast

pub mod config;
pub mod progress;
pub mod signals;
pub mod stats;

use std::time::Instant;

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::app::cache::{ensure_cache_dir, tile_cache_path, CacheManifest, CachedTile, PurgeReport};
use crate::app::client::TileSource;
use crate::app::geo::{to_tile_rect, TileIndexRect};
use crate::app::mosaic::{self, MosaicSummary};
use crate::errors::{AppError, MergeError, Result};

pub use config::RunConfig;
pub use progress::{progress_channel, ProgressEvent, ProgressReporter};
pub use signals::{create_shutdown_channel, shutdown_requested, SignalHandler};
pub use stats::{FetchStats, SessionResult, SessionStatus};

/// Drives a single fetch-and-merge run
pub struct Coordinator<S: TileSource> {
    config: RunConfig,
    source: S,
    manifest: CacheManifest,
    stats: FetchStats,
    progress: ProgressReporter,
}

impl<S: TileSource> Coordinator<S> {
    pub fn new(config: RunConfig, source: S) -> Self {
        Self {
            config,
            source,
            manifest: CacheManifest::new(),
            stats: FetchStats::default(),
            progress: ProgressReporter::disabled(),
        }
    }

    /// Send progress events to `progress`
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Tiles written by this run so far.
    ///
    /// Entries stay listed after a purge, so after a cancelled or failed run
    /// (without `keep_cache`) the files they name may already be gone.
    pub fn manifest(&self) -> &CacheManifest {
        &self.manifest
    }

    pub fn stats(&self) -> &FetchStats {
        &self.stats
    }

    /// Run the pipeline to completion, cancellation or the first error
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: invalid bounds or zoom, an unusable
    /// cache directory, a failed tile fetch or a failed merge
    pub async fn run(&mut self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<SessionResult> {
        self.config.validate()?;
        let rect = to_tile_rect(&self.config.bbox, self.config.zoom)?;
        ensure_cache_dir(&self.config.cache_dir).await?;

        self.stats = FetchStats::new_with_expected_tiles(rect.tile_count());
        info!(
            "Fetching {} at zoom {} ({})",
            self.config.bbox, self.config.zoom, rect
        );
        self.progress.emit(ProgressEvent::FetchStarted {
            rect,
            zoom: self.config.zoom,
            total: rect.tile_count(),
        });

        for tile in rect.iter() {
            if shutdown_requested(&mut shutdown_rx) {
                return Ok(self.cancel());
            }

            let path = tile_cache_path(&self.config.cache_dir, tile, self.config.zoom);
            let started = Instant::now();
            let size = match self.source.fetch(tile, self.config.zoom, &path).await {
                Ok(size) => size,
                Err(e) => {
                    error!("Failed to fetch tile {}: {}", tile, e);
                    return Err(self.fail(e.into()));
                }
            };
            let elapsed = started.elapsed();

            self.manifest.record(CachedTile {
                index: tile,
                path,
                size,
                elapsed,
            });
            self.stats.record_tile(size, elapsed);
            self.progress.emit(ProgressEvent::TileFetched {
                index: tile,
                position: self.stats.tiles_fetched,
                total: self.stats.tiles_total,
                bytes: size,
                elapsed,
            });
        }

        if shutdown_requested(&mut shutdown_rx) {
            return Ok(self.cancel());
        }

        let summary = match self.merge(rect).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("Failed to merge tiles: {}", e);
                return Err(self.fail(e.into()));
            }
        };

        let purge = self.purge();
        self.stats.update_duration();
        Ok(SessionResult::completed(self.stats.clone(), summary, purge))
    }

    async fn merge(&self, rect: TileIndexRect) -> std::result::Result<MosaicSummary, MergeError> {
        self.progress.emit(ProgressEvent::MergeStarted {
            tiles: rect.tile_count(),
        });

        let zoom = self.config.zoom;
        let cache_dir = self.config.cache_dir.clone();
        let output = self.config.output.clone();
        let summary = tokio::task::spawn_blocking(move || {
            mosaic::merge(&rect, zoom, &cache_dir, &output)
        })
        .await
        .map_err(|e| MergeError::TaskFailed {
            reason: e.to_string(),
        })??;

        self.progress.emit(ProgressEvent::MergeFinished(summary.clone()));
        Ok(summary)
    }

    /// Remove the recorded tiles unless the cache is kept
    fn purge(&self) -> Option<PurgeReport> {
        if self.config.keep_cache {
            debug!("Keeping {} cached tiles", self.manifest.len());
            return None;
        }

        let report = self.manifest.purge_all();
        info!(
            "Purged {} cached tiles ({} could not be removed)",
            report.removed, report.failed
        );
        self.progress.emit(ProgressEvent::CachePurged(report));
        Some(report)
    }

    fn cancel(&mut self) -> SessionResult {
        warn!(
            "Cancelled after {} of {} tiles",
            self.stats.tiles_fetched, self.stats.tiles_total
        );
        self.progress.emit(ProgressEvent::Cancelled {
            fetched: self.stats.tiles_fetched,
            total: self.stats.tiles_total,
        });
        let purge = self.purge();
        self.stats.update_duration();
        SessionResult::cancelled(self.stats.clone(), purge)
    }

    fn fail(&mut self, error: AppError) -> AppError {
        self.purge();
        self.stats.update_duration();
        error
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use image::{ImageFormat, Rgb, RgbImage};
    use tempfile::TempDir;

    use super::*;
    use crate::app::geo::{GeoBoundingBox, TileIndex};
    use crate::errors::{DownloadError, DownloadResult};

    /// Writes a solid 4x4 tile for every request
    struct SolidTiles;

    impl TileSource for SolidTiles {
        async fn fetch(&self, tile: TileIndex, _zoom: u8, destination: &Path) -> DownloadResult<u64> {
            let image = RgbImage::from_pixel(4, 4, Rgb([tile.x as u8, tile.y as u8, 0]));
            image
                .save_with_format(destination, ImageFormat::Png)
                .map_err(|e| DownloadError::Io {
                    path: destination.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
                })?;
            Ok(std::fs::metadata(destination).map(|m| m.len()).unwrap_or(0))
        }
    }

    struct Unreachable;

    impl TileSource for Unreachable {
        async fn fetch(&self, _tile: TileIndex, _zoom: u8, _destination: &Path) -> DownloadResult<u64> {
            Err(DownloadError::EmptyResponse {
                url: "http://tiles.invalid/".to_string(),
            })
        }
    }

    fn run_config(temp_dir: &TempDir) -> RunConfig {
        RunConfig::new(GeoBoundingBox::point(0.5, 0.5).unwrap())
            .with_zoom(1)
            .with_cache_dir(temp_dir.path().join("cache"))
            .with_output(temp_dir.path().join("out.png"))
    }

    #[tokio::test]
    async fn test_single_tile_run() {
        let temp_dir = TempDir::new().unwrap();
        let (_tx, rx) = create_shutdown_channel();
        let mut coordinator = Coordinator::new(run_config(&temp_dir), SolidTiles);

        let result = coordinator.run(rx).await.unwrap();

        assert_eq!(result.status, SessionStatus::Completed);
        let mosaic = result.mosaic.unwrap();
        assert_eq!((mosaic.width, mosaic.height), (4, 4));
        assert_eq!(result.purge.unwrap().removed, 1);
        assert!(temp_dir.path().join("out.png").exists());
        assert!(!temp_dir.path().join("cache").join("1-1.0.png").exists());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let (_tx, rx) = create_shutdown_channel();
        let mut coordinator = Coordinator::new(run_config(&temp_dir), Unreachable);

        let result = coordinator.run(rx).await;

        assert!(matches!(
            result,
            Err(AppError::Download(DownloadError::EmptyResponse { .. }))
        ));
        assert!(coordinator.manifest().is_empty());
        assert!(!temp_dir.path().join("out.png").exists());
    }

    #[tokio::test]
    async fn test_cancel_before_first_tile() {
        let temp_dir = TempDir::new().unwrap();
        let (tx, rx) = create_shutdown_channel();
        tx.send(()).unwrap();
        let mut coordinator = Coordinator::new(run_config(&temp_dir), SolidTiles);

        let result = coordinator.run(rx).await.unwrap();

        assert!(result.is_cancelled());
        assert_eq!(result.stats.tiles_fetched, 0);
        assert!(coordinator.manifest().is_empty());
        assert!(!temp_dir.path().join("out.png").exists());
    }

    #[tokio::test]
    async fn test_invalid_zoom_touches_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let (_tx, rx) = create_shutdown_channel();
        let config = run_config(&temp_dir).with_zoom(30);
        let mut coordinator = Coordinator::new(config, SolidTiles);

        let result = coordinator.run(rx).await;

        assert!(matches!(result, Err(AppError::Bounds(_))));
        assert!(!temp_dir.path().join("cache").exists());
    }
}
