//! Application constants for OSM Mosaic
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// Slippy-map tile grid constants
pub mod tiles {
    /// Zoom level used when none is given
    pub const DEFAULT_ZOOM: u8 = 12;

    /// Highest zoom level served by the OpenStreetMap tile servers
    pub const MAX_ZOOM: u8 = 19;

    /// Longitude limits in degrees
    pub const MIN_LON: f64 = -180.0;
    pub const MAX_LON: f64 = 180.0;

    /// Latitude limits in degrees (the poles themselves are rejected)
    pub const MIN_LAT: f64 = -90.0;
    pub const MAX_LAT: f64 = 90.0;

    /// Default tile mirrors, used round-robin
    pub const DEFAULT_MIRRORS: [&str; 3] = [
        "http://a.tile.openstreetmap.org",
        "http://b.tile.openstreetmap.org",
        "http://c.tile.openstreetmap.org",
    ];

    /// Extension of every cached tile and of the mosaic
    pub const TILE_EXTENSION: &str = "png";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("osm_mosaic/", env!("CARGO_PKG_VERSION"));

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
}

/// Request pacing
pub mod limits {
    /// Default rate limit for tile requests (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 2;
}

/// File operation constants
pub mod files {
    /// Default tile cache directory
    pub const DEFAULT_CACHE_DIR: &str = "/tmp/.osmpng_cache/";

    /// Default mosaic destination
    pub const DEFAULT_OUTPUT: &str = "output.png";

    /// Temporary file suffix for atomic operations
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Directory name under the platform config dir
    pub const CONFIG_DIR_NAME: &str = "osm_mosaic";

    /// Configuration file name
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

/// Process exit codes
pub mod exit_codes {
    /// Any fatal error
    pub const FAILURE: i32 = 1;

    /// Run cancelled by an interrupt signal
    pub const CANCELLED: i32 = 42;
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}

// Re-export commonly used constants for convenience
pub use files::{DEFAULT_CACHE_DIR, DEFAULT_OUTPUT, TEMP_FILE_SUFFIX};
pub use http::USER_AGENT;
pub use limits::DEFAULT_RATE_LIMIT_RPS;
pub use tiles::{DEFAULT_ZOOM, MAX_ZOOM};
