//! Core application logic for osm_mosaic
//!
//! Tile maths, fetching, caching, mosaic merge and the coordinator that
//! ties them together into one run.
//!
//! # Examples
//!
//! ```rust,no_run
//! use osm_mosaic::app::{
//!     create_shutdown_channel, Coordinator, GeoBoundingBox, RunConfig, TileClient,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bbox = GeoBoundingBox::from_ranges("11.0-11.1", "46.0-46.1")?;
//! let config = RunConfig::new(bbox).with_zoom(14).with_output("dolomites.png");
//!
//! let (_shutdown_tx, shutdown_rx) = create_shutdown_channel();
//! let mut coordinator = Coordinator::new(config, TileClient::new()?);
//! let result = coordinator.run(shutdown_rx).await?;
//! println!("{}", result.summary());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod coordinator;
pub mod geo;
pub mod mosaic;

// Re-export main public API
pub use cache::{CacheManifest, CachedTile, PurgeReport};
pub use client::{ClientConfig, TileClient, TileSource};
pub use coordinator::{
    create_shutdown_channel, progress_channel, Coordinator, FetchStats, ProgressEvent,
    ProgressReporter, RunConfig, SessionResult, SessionStatus, SignalHandler,
};
pub use geo::{to_tile_rect, GeoBoundingBox, TileIndex, TileIndexRect};
pub use mosaic::{merge, MosaicRaster, MosaicSummary};
