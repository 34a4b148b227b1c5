//! Core HTTP operations with rate limiting
//!
//! Requests are paced by a client-side rate limiter and are never retried:
//! a failed request fails the tile, and a failed tile fails the run.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::Client;
use url::Url;

use crate::errors::{DownloadError, DownloadResult};

type DirectRateLimiter = RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>;

/// HTTP operations handler
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    rate_limiter: DirectRateLimiter,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client and rate limiting
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::InvalidRateLimit` if `rate_limit_rps` is zero
    pub fn new(client: Client, rate_limit_rps: u32) -> DownloadResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    fn build_rate_limiter(rate_limit_rps: u32) -> DownloadResult<DirectRateLimiter> {
        let quota =
            Quota::per_second(NonZeroU32::new(rate_limit_rps).ok_or(DownloadError::InvalidRateLimit)?);
        Ok(RateLimiter::direct(quota))
    }

    /// Issue a GET request and return the response if its status is success
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Http` on transport failure and
    /// `DownloadError::ServerError` on a non-success status
    pub async fn get_response(&self, url: &Url) -> DownloadResult<reqwest::Response> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
            .await;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| DownloadError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Tile request returned HTTP {}: {}", status.as_u16(), url);
            return Err(DownloadError::ServerError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        tracing::debug!("Successfully fetched response: {}", url);
        Ok(response)
    }
}
