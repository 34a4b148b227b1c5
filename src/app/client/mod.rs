//! Tile fetching from slippy-map mirror servers
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: rate-limited GET requests
//! - `download`: atomic write of a response body to disk
//!
//! [`TileSource`] is the seam the coordinator fetches through; [`TileClient`]
//! is the HTTP implementation that rotates across the configured mirrors.

use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use url::Url;

use crate::app::geo::TileIndex;
use crate::constants::tiles::TILE_EXTENSION;
use crate::errors::{DownloadError, DownloadResult};

pub mod config;
pub mod download;
pub mod http;

pub use config::ClientConfig;

use download::DownloadHandler;
use http::HttpHandler;

/// Something that can place one tile image at a path on disk
pub trait TileSource: Send + Sync {
    /// Fetch `tile` at `zoom` into `destination`, overwriting it, and return
    /// the number of bytes written
    fn fetch(
        &self,
        tile: TileIndex,
        zoom: u8,
        destination: &Path,
    ) -> impl Future<Output = DownloadResult<u64>> + Send;
}

impl<T: TileSource + ?Sized> TileSource for &T {
    fn fetch(
        &self,
        tile: TileIndex,
        zoom: u8,
        destination: &Path,
    ) -> impl Future<Output = DownloadResult<u64>> + Send {
        (**self).fetch(tile, zoom, destination)
    }
}

/// HTTP client for slippy-map tile servers
///
/// Each fetch uses the next mirror in the configured list, wrapping around,
/// independent of the tile requested.
#[derive(Debug)]
pub struct TileClient {
    http_handler: HttpHandler,
    mirrors: Vec<String>,
    next_mirror: AtomicUsize,
}

impl TileClient {
    /// Creates a client with the default OpenStreetMap mirrors
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the HTTP client cannot be built
    pub fn new() -> DownloadResult<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Creates a client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if no mirror is configured, a mirror is not a
    /// valid base URL, the rate limit is zero, or the HTTP client cannot be
    /// built
    pub fn with_config(config: &ClientConfig) -> DownloadResult<Self> {
        if config.mirrors.is_empty() {
            return Err(DownloadError::NoMirrors);
        }

        let mirrors = config
            .mirrors
            .iter()
            .map(|mirror| validate_mirror(mirror))
            .collect::<DownloadResult<Vec<_>>>()?;

        let client = config.build_http_client()?;
        let http_handler = HttpHandler::new(client, config.rate_limit_rps)?;

        tracing::info!("Created tile client with {} mirrors", mirrors.len());

        Ok(Self {
            http_handler,
            mirrors,
            next_mirror: AtomicUsize::new(0),
        })
    }

    /// URL of `tile` on the next mirror in rotation
    pub fn next_tile_url(&self, tile: TileIndex, zoom: u8) -> DownloadResult<Url> {
        let slot = self.next_mirror.fetch_add(1, Ordering::Relaxed) % self.mirrors.len();
        tile_url(&self.mirrors[slot], tile, zoom)
    }
}

impl TileSource for TileClient {
    async fn fetch(&self, tile: TileIndex, zoom: u8, destination: &Path) -> DownloadResult<u64> {
        let url = self.next_tile_url(tile, zoom)?;
        tracing::debug!(tile = %tile, zoom, "Fetching {}", url);

        DownloadHandler::new(&self.http_handler)
            .download_file(&url, destination)
            .await
    }
}

/// Build `{mirror}/{zoom}/{x}/{y}.png`
pub fn tile_url(mirror: &str, tile: TileIndex, zoom: u8) -> DownloadResult<Url> {
    let url = format!(
        "{}/{}/{}/{}.{}",
        mirror, zoom, tile.x, tile.y, TILE_EXTENSION
    );
    Url::parse(&url).map_err(|e| DownloadError::InvalidUrl {
        url,
        error: e.to_string(),
    })
}

fn validate_mirror(mirror: &str) -> DownloadResult<String> {
    let trimmed = mirror.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| DownloadError::InvalidUrl {
        url: mirror.to_string(),
        error: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
        return Err(DownloadError::InvalidUrl {
            url: mirror.to_string(),
            error: "expected an http(s) base URL".to_string(),
        });
    }

    Ok(trimmed.to_string())
}
