//! Configuration management for osm_mosaic
//!
//! Settings come from, lowest precedence first: built-in defaults, a TOML
//! file, and command-line flags. The file is either given with `--config`
//! or looked up in the platform config directory; a missing default file is
//! not an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ClientConfig, GeoBoundingBox, RunConfig};
use crate::constants::{files, http, limits, logging, tiles};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Tile cache settings
    pub cache: CacheConfigToml,
    /// Mosaic output settings
    pub output: OutputConfigToml,
    /// Tile grid settings
    pub tiles: TilesConfigToml,
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfigToml {
    /// Cache directory path
    pub dir: PathBuf,
    /// Keep cached tiles after the run
    pub keep: bool,
}

impl Default for CacheConfigToml {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(files::DEFAULT_CACHE_DIR),
            keep: false,
        }
    }
}

/// TOML-friendly output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfigToml {
    /// Mosaic destination
    pub path: PathBuf,
}

impl Default for OutputConfigToml {
    fn default() -> Self {
        Self {
            path: PathBuf::from(files::DEFAULT_OUTPUT),
        }
    }
}

/// TOML-friendly tile grid configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilesConfigToml {
    /// Zoom used when none is given on the command line or at the prompt
    pub default_zoom: u8,
}

impl Default for TilesConfigToml {
    fn default() -> Self {
        Self {
            default_zoom: tiles::DEFAULT_ZOOM,
        }
    }
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Tile server base URLs, used round-robin
    pub mirrors: Vec<String>,
    /// User agent sent with every request
    pub user_agent: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Connection pool idle timeout in seconds (None = no timeout)
    pub pool_idle_timeout_secs: Option<u64>,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            mirrors: tiles::DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect(),
            user_agent: http::USER_AGENT.to_string(),
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            pool_idle_timeout_secs: Some(http::POOL_IDLE_TIMEOUT.as_secs()),
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parsed log level
    pub fn level(&self) -> ConfigResult<tracing::Level> {
        self.level.parse().map_err(|_| ConfigError::InvalidValue {
            field: "logging.level".to_string(),
            value: self.level.clone(),
            reason: "Expected one of error, warn, info, debug, trace".to_string(),
        })
    }
}

impl AppConfig {
    /// Load configuration from `config_file_override` or the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if an explicitly given file does not
    /// exist, and a read, parse or validation error for a file that does
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                Self::load_from_file(&path).await?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::load_from_file(&path).await?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Default config file path for the current user, if the platform has one
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(files::CONFIG_DIR_NAME)
                .join(files::CONFIG_FILE_NAME)
        })
    }

    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used
    pub fn validate(&self) -> ConfigResult<()> {
        if self.tiles.default_zoom > tiles::MAX_ZOOM {
            return Err(ConfigError::InvalidValue {
                field: "tiles.default_zoom".to_string(),
                value: self.tiles.default_zoom.to_string(),
                reason: format!("Must be between 0 and {}", tiles::MAX_ZOOM),
            });
        }

        if self.client.mirrors.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "client.mirrors".to_string(),
                value: "[]".to_string(),
                reason: "At least one mirror is required".to_string(),
            });
        }

        if self.client.rate_limit_rps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.rate_limit_rps".to_string(),
                value: "0".to_string(),
                reason: "Rate limit must be greater than 0".to_string(),
            });
        }

        if self.client.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.request_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        self.logging.level()?;
        Ok(())
    }

    /// Run configuration for `bbox`, falling back to the configured zoom
    pub fn to_run_config(&self, bbox: GeoBoundingBox, zoom: Option<u8>) -> RunConfig {
        RunConfig::new(bbox)
            .with_zoom(zoom.unwrap_or(self.tiles.default_zoom))
            .with_cache_dir(self.cache.dir.clone())
            .with_output(self.output.path.clone())
            .with_keep_cache(self.cache.keep)
    }

    /// HTTP client configuration
    pub fn to_client_config(&self) -> ClientConfig {
        self.client.to_runtime_config()
    }

    /// Default configuration file content with comments
    pub fn generate_default_config_content() -> String {
        let defaults = Self::default();
        let mirrors = defaults
            .client
            .mirrors
            .iter()
            .map(|m| format!("\"{}\"", m))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"# osm_mosaic configuration
# Command-line flags override these settings.

[cache]
# Directory tiles are cached in
dir = "{cache_dir}"

# Keep cached tiles after the mosaic is written
keep = false

[output]
# Mosaic destination
path = "{output}"

[tiles]
# Zoom used when none is given
default_zoom = {zoom}

[client]
# Tile servers, used round-robin
mirrors = [{mirrors}]

user_agent = "{user_agent}"
request_timeout_secs = {request_timeout}
connect_timeout_secs = {connect_timeout}
pool_idle_timeout_secs = {pool_idle_timeout}

# Requests per second across all mirrors
rate_limit_rps = {rate_limit}

[logging]
# error, warn, info, debug or trace
level = "{level}"
"#,
            cache_dir = defaults.cache.dir.display(),
            output = defaults.output.path.display(),
            zoom = defaults.tiles.default_zoom,
            mirrors = mirrors,
            user_agent = defaults.client.user_agent,
            request_timeout = defaults.client.request_timeout_secs,
            connect_timeout = defaults.client.connect_timeout_secs,
            pool_idle_timeout = http::POOL_IDLE_TIMEOUT.as_secs(),
            rate_limit = defaults.client.rate_limit_rps,
            level = defaults.logging.level,
        )
    }
}

impl ClientConfigToml {
    /// Convert to runtime client configuration
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            mirrors: self.mirrors.clone(),
            user_agent: self.user_agent.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            pool_idle_timeout: self.pool_idle_timeout_secs.map(Duration::from_secs),
            rate_limit_rps: self.rate_limit_rps,
        }
    }
}
