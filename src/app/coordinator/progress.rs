//! Progress events emitted while a run is in flight
//!
//! The coordinator pushes [`ProgressEvent`]s into an unbounded mpsc channel;
//! whoever holds the receiver (the CLI progress bar, a test) decides how to
//! render them. Sending never blocks the fetch loop and a dropped receiver
//! is ignored.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::trace;

use crate::app::cache::PurgeReport;
use crate::app::geo::{TileIndex, TileIndexRect};
use crate::app::mosaic::MosaicSummary;

/// One step of a run
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Tile fetching is about to begin
    FetchStarted {
        rect: TileIndexRect,
        zoom: u8,
        total: u64,
    },
    /// One tile was written to the cache
    TileFetched {
        index: TileIndex,
        /// 1-based position in fetch order
        position: u64,
        total: u64,
        bytes: u64,
        elapsed: Duration,
    },
    /// All tiles fetched, composition starting
    MergeStarted { tiles: u64 },
    MergeFinished(MosaicSummary),
    CachePurged(PurgeReport),
    /// A shutdown request was observed
    Cancelled { fetched: u64, total: u64 },
}

/// Optional sink for progress events
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressReporter {
    pub fn new(tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Reporter that discards every event
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                trace!("Progress receiver dropped");
            }
        }
    }
}

/// Create a reporter together with the receiving end of its channel
pub fn progress_channel() -> (ProgressReporter, mpsc::UnboundedReceiver<ProgressEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressReporter::new(tx), rx)
}
