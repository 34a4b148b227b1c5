//! osm_mosaic library
//!
//! Fetches the OpenStreetMap slippy-map tiles covering a longitude/latitude
//! rectangle at one zoom level, caches them on disk and merges them into a
//! single PNG mosaic. Tiles are fetched sequentially and round-robin across
//! a fixed set of mirrors.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
