//! Command-line argument parsing for osm_mosaic
//!
//! Coordinates are taken as positional `LONGITUDE LATITUDE [ZOOM]`, each
//! coordinate being a single value or a `min-max` range. Leaving them out
//! switches to interactive prompts.

use std::path::PathBuf;

use clap::Parser;

/// osm_mosaic - Stitch OpenStreetMap tiles into one PNG
#[derive(Parser, Debug)]
#[command(
    name = "osm_mosaic",
    version,
    about = "Download OpenStreetMap tiles for an area and merge them into one PNG",
    long_about = "Downloads every slippy-map tile covering a longitude/latitude rectangle at one zoom level,
caches the tiles on disk and stitches them into a single PNG mosaic.

Coordinates are single values (11.5) or ranges (11.0-11.1). Negative values work on both
sides of a range (-10.5--9.8). Without coordinates the tool asks for them on stdin."
)]
pub struct Cli {
    /// Longitude or longitude range in degrees
    #[arg(value_name = "LONGITUDE", allow_hyphen_values = true, requires = "latitude")]
    pub longitude: Option<String>,

    /// Latitude or latitude range in degrees
    #[arg(value_name = "LATITUDE", allow_hyphen_values = true)]
    pub latitude: Option<String>,

    /// Zoom level (default 12)
    #[arg(value_name = "ZOOM")]
    pub zoom: Option<u8>,

    /// Cache directory path
    #[arg(short, long, value_name = "DIR")]
    pub cache: Option<PathBuf>,

    /// Mosaic output file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Keep cached tiles after the mosaic is written
    #[arg(short, long)]
    pub keep_cache: bool,

    /// Quiet mode - suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long)]
    pub very_verbose: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print a default configuration file and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Coordinates given on the command line, if both are present
    pub fn coordinates(&self) -> Option<(&str, &str)> {
        match (&self.longitude, &self.latitude) {
            (Some(lon), Some(lat)) => Some((lon.as_str(), lat.as_str())),
            _ => None,
        }
    }

    /// Get the logging level from the flags, falling back to `configured`
    pub fn log_level(&self, configured: tracing::Level) -> tracing::Level {
        if self.very_verbose {
            tracing::Level::DEBUG
        } else if self.verbose {
            tracing::Level::INFO
        } else if self.quiet {
            tracing::Level::ERROR
        } else {
            configured
        }
    }
}
