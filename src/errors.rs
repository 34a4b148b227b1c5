//! Error types for OSM Mosaic
//!
//! This module defines the error types for every stage of the pipeline.
//! Errors are designed to be actionable and name the offending value, tile
//! or path so a failed run can be diagnosed from its message alone.

use std::path::PathBuf;

use thiserror::Error;

use crate::app::geo::TileIndex;

/// Invalid geographic input, detected before any network activity
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    /// Longitude outside [-180, 180]
    #[error("Longitude {value} is outside [-180, 180] degrees")]
    LongitudeOutOfRange { value: f64 },

    /// Latitude outside (-90, 90)
    #[error("Latitude {value} is outside (-90, 90) degrees")]
    LatitudeOutOfRange { value: f64 },

    /// Coordinate text could not be parsed as a number or a range
    #[error("Invalid coordinate '{input}'. Expected a number or a range like '11.0-11.1'")]
    InvalidNumber { input: String },

    /// Zoom level above the supported maximum
    #[error("Invalid zoom level {zoom}. Must be between 0 and {max}")]
    InvalidZoom { zoom: u8, max: u8 },

    /// Zoom text could not be parsed
    #[error("Invalid zoom level '{input}'")]
    InvalidZoomText { input: String },

    /// Transformed tile index falls outside the grid at this zoom
    #[error("Tile index {axis}={value} is outside the {size}x{size} grid at zoom {zoom}")]
    TileOutOfRange {
        axis: &'static str,
        value: f64,
        size: u32,
        zoom: u8,
    },
}

/// Tile fetch errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error
    #[error("HTTP request failed for {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server returned error status
    #[error("Server error: HTTP {status} for {url}")]
    ServerError { url: String, status: u16 },

    /// Server answered with an empty body
    #[error("Empty response for {url}")]
    EmptyResponse { url: String },

    /// I/O error while writing the tile
    #[error("Cannot write tile to {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Atomic file operation failed
    #[error("Atomic file operation failed: could not rename {temp_path} to {final_path}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid mirror URL
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// No mirrors configured
    #[error("At least one tile mirror must be configured")]
    NoMirrors,

    /// HTTP client could not be built
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// Rate limit set to zero
    #[error("Rate limit must be greater than zero")]
    InvalidRateLimit,
}

/// Mosaic merge errors
#[derive(Error, Debug)]
pub enum MergeError {
    /// A cached tile could not be opened or decoded
    #[error("Cannot read tile {path}")]
    TileRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A cached tile disagrees with the reference tile size
    #[error(
        "Tile {tile} ({path}) is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}"
    )]
    DimensionMismatch {
        tile: TileIndex,
        path: PathBuf,
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// Mosaic dimensions overflow
    #[error("Mosaic of {columns}x{rows} tiles of {tile_width}x{tile_height} pixels is too large")]
    MosaicTooLarge {
        columns: u32,
        rows: u32,
        tile_width: u32,
        tile_height: u32,
    },

    /// Tile could not be placed on the mosaic
    #[error("Cannot place tile {tile} on the mosaic")]
    Placement {
        tile: TileIndex,
        #[source]
        source: image::ImageError,
    },

    /// The mosaic could not be encoded to its destination
    #[error("Cannot write mosaic to {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Filesystem error while finalizing the mosaic
    #[error("File I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The blocking merge task did not complete
    #[error("Merge task failed: {reason}")]
    TaskFailed { reason: String },
}

/// Cache management errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache directory not found or inaccessible
    #[error("Cache directory not accessible: {path}")]
    DirectoryNotAccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Cannot read configuration file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid bounding box or zoom
    #[error(transparent)]
    Bounds(#[from] BoundsError),

    /// Tile fetch error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Mosaic merge error
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Cache error
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("{message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Bounds(_) => "bounds",
            AppError::Download(_) => "download",
            AppError::Merge(_) => "merge",
            AppError::Cache(_) => "cache",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Bounds result type alias
pub type BoundsResult<T> = std::result::Result<T, BoundsError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Merge result type alias
pub type MergeResult<T> = std::result::Result<T, MergeError>;

/// Cache result type alias
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Config result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
