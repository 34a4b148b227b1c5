//! Prelude module for osm_mosaic
//!
//! Re-exports the items needed for a typical run with a single
//! `use osm_mosaic::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use osm_mosaic::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let bbox = GeoBoundingBox::from_ranges("11.0-11.1", "46.0-46.1")?;
//!     let (_shutdown_tx, shutdown_rx) = create_shutdown_channel();
//!
//!     let mut coordinator = Coordinator::new(RunConfig::new(bbox), TileClient::new()?);
//!     let result = coordinator.run(shutdown_rx).await?;
//!     println!("{}", result.summary());
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

pub use crate::app::{
    create_shutdown_channel, ClientConfig, Coordinator, GeoBoundingBox, MosaicSummary,
    RunConfig, SessionResult, SessionStatus, TileClient, TileIndex, TileIndexRect, TileSource,
};

pub use crate::config::AppConfig;
