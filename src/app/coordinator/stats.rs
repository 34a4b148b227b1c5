//! Fetch statistics and session results
//!
//! Collects per-run counters while tiles are fetched and describes how the
//! run ended.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::cache::PurgeReport;
use crate::app::mosaic::MosaicSummary;

/// Aggregated fetch statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchStats {
    /// Tiles in the requested rectangle
    pub tiles_total: u64,
    /// Tiles fetched so far
    pub tiles_fetched: u64,
    /// Bytes written to the cache
    pub bytes_fetched: u64,
    /// Time spent inside tile fetches
    pub fetch_duration: Duration,
    /// Start of the run
    pub session_start: DateTime<Utc>,
    /// Wall-clock duration of the run
    pub session_duration: Duration,
}

impl Default for FetchStats {
    fn default() -> Self {
        Self {
            tiles_total: 0,
            tiles_fetched: 0,
            bytes_fetched: 0,
            fetch_duration: Duration::ZERO,
            session_start: Utc::now(),
            session_duration: Duration::ZERO,
        }
    }
}

impl FetchStats {
    pub fn new_with_expected_tiles(tiles_total: u64) -> Self {
        Self {
            tiles_total,
            ..Default::default()
        }
    }

    /// Account for one fetched tile
    pub fn record_tile(&mut self, bytes: u64, elapsed: Duration) {
        self.tiles_fetched += 1;
        self.bytes_fetched += bytes;
        self.fetch_duration += elapsed;
    }

    /// Calculate completion percentage
    pub fn completion_percentage(&self) -> f64 {
        if self.tiles_total == 0 {
            return 0.0;
        }
        (self.tiles_fetched as f64 / self.tiles_total as f64) * 100.0
    }

    /// Average fetch rate over time spent fetching, in bytes per second
    pub fn average_rate_bps(&self) -> Option<f64> {
        let secs = self.fetch_duration.as_secs_f64();
        (secs > 0.0).then(|| self.bytes_fetched as f64 / secs)
    }

    /// Update session duration from start time
    pub fn update_duration(&mut self) {
        self.session_duration = Utc::now()
            .signed_duration_since(self.session_start)
            .to_std()
            .unwrap_or(Duration::ZERO);
    }
}

/// How a run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Every tile fetched and the mosaic written
    Completed,
    /// A shutdown request was observed before the mosaic was written
    Cancelled,
}

/// Final result of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    pub status: SessionStatus,
    pub stats: FetchStats,
    /// Written mosaic, present only for completed runs
    pub mosaic: Option<MosaicSummary>,
    /// Outcome of the cache purge, absent when the cache was kept
    pub purge: Option<PurgeReport>,
}

impl SessionResult {
    pub fn completed(stats: FetchStats, mosaic: MosaicSummary, purge: Option<PurgeReport>) -> Self {
        Self {
            status: SessionStatus::Completed,
            stats,
            mosaic: Some(mosaic),
            purge,
        }
    }

    pub fn cancelled(stats: FetchStats, purge: Option<PurgeReport>) -> Self {
        Self {
            status: SessionStatus::Cancelled,
            stats,
            mosaic: None,
            purge,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == SessionStatus::Cancelled
    }

    /// Get a summary of the session result
    pub fn summary(&self) -> String {
        let rate = match self.stats.average_rate_bps() {
            Some(bps) => format!("{:.0} B/s", bps),
            None => "-".to_string(),
        };
        match (&self.status, &self.mosaic) {
            (SessionStatus::Completed, Some(mosaic)) => format!(
                "Wrote {}x{} mosaic from {} tiles to {} in {:?} ({} bytes @ {})",
                mosaic.width,
                mosaic.height,
                mosaic.tiles,
                mosaic.path.display(),
                self.stats.session_duration,
                self.stats.bytes_fetched,
                rate
            ),
            _ => format!(
                "Cancelled after {} of {} tiles ({:.1}%, {} bytes @ {})",
                self.stats.tiles_fetched,
                self.stats.tiles_total,
                self.stats.completion_percentage(),
                self.stats.bytes_fetched,
                rate
            ),
        }
    }
}
