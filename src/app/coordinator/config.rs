//! Run configuration for the coordinator
//!
//! Everything a single run needs is carried explicitly in [`RunConfig`];
//! the coordinator holds no process-wide state.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::app::geo::{validate_zoom, GeoBoundingBox};
use crate::constants::{files, tiles};
use crate::errors::BoundsResult;

/// Parameters of one fetch-and-merge run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Area to cover
    pub bbox: GeoBoundingBox,
    /// Zoom level of the tiles
    pub zoom: u8,
    /// Directory tiles are cached in
    pub cache_dir: PathBuf,
    /// Destination of the mosaic
    pub output: PathBuf,
    /// Leave cached tiles on disk after the run
    pub keep_cache: bool,
}

impl RunConfig {
    /// Configuration for `bbox` with the default zoom, cache and output
    pub fn new(bbox: GeoBoundingBox) -> Self {
        Self {
            bbox,
            zoom: tiles::DEFAULT_ZOOM,
            cache_dir: PathBuf::from(files::DEFAULT_CACHE_DIR),
            output: PathBuf::from(files::DEFAULT_OUTPUT),
            keep_cache: false,
        }
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_keep_cache(mut self, keep_cache: bool) -> Self {
        self.keep_cache = keep_cache;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> BoundsResult<()> {
        validate_zoom(self.zoom).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BoundsError;

    fn munich() -> GeoBoundingBox {
        GeoBoundingBox::point(11.5755, 48.1372).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::new(munich());
        assert_eq!(config.zoom, tiles::DEFAULT_ZOOM);
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/.osmpng_cache/"));
        assert_eq!(config.output, PathBuf::from("output.png"));
        assert!(!config.keep_cache);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = RunConfig::new(munich())
            .with_zoom(3)
            .with_cache_dir("/var/tmp/tiles")
            .with_output("map.png")
            .with_keep_cache(true);

        assert_eq!(config.zoom, 3);
        assert_eq!(config.cache_dir, PathBuf::from("/var/tmp/tiles"));
        assert_eq!(config.output, PathBuf::from("map.png"));
        assert!(config.keep_cache);
    }

    #[test]
    fn test_invalid_zoom() {
        let config = RunConfig::new(munich()).with_zoom(tiles::MAX_ZOOM + 1);
        assert!(matches!(
            config.validate(),
            Err(BoundsError::InvalidZoom { .. })
        ));
    }
}
