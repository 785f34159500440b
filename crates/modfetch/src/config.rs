//! Fetch configuration (modfetch.toml)
//!
//! One [`FetchConfig`] value is built per process and handed to the
//! [`Fetcher`](crate::Fetcher), [`FreshnessTracker`](crate::FreshnessTracker)
//! and [`NotationResolver`](crate::NotationResolver) at construction.
//!
//! ```toml
//! cache_root = "/home/me/.modfetch/cache"
//! ttl_secs = 3600
//! api_base = "https://api.github.com"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default GitHub REST endpoint
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default staleness window (1 hour)
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Process-wide fetch settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchConfig {
    /// Root of the shared cache, outside any build directory
    #[serde(default = "default_cache_root")]
    pub cache_root: PathBuf,

    /// Time-to-live of every cache entry and resolved version, in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Base URL of the hosting platform API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for API requests, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout, in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Timeout for artifact downloads, in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
}

fn default_cache_root() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".modfetch").join("cache"))
        .unwrap_or_else(|| PathBuf::from(".modfetch").join("cache"))
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_user_agent() -> String {
    format!("modfetch/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_download_timeout_secs() -> u64 {
    600
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            cache_root: default_cache_root(),
            ttl_secs: default_ttl_secs(),
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            download_timeout_secs: default_download_timeout_secs(),
        }
    }
}

impl FetchConfig {
    /// Default settings with the cache rooted at `cache_root`
    pub fn with_cache_root(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            ..Self::default()
        }
    }

    /// Replace the TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl.as_secs();
        self
    }

    /// Replace the API base URL
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    /// Load a config from a TOML file
    ///
    /// Missing keys take their defaults. The result is validated.
    ///
    /// # Arguments
    /// * `path` - Path to a `modfetch.toml`
    ///
    /// # Returns
    /// The parsed config, or the read, parse or validation error
    ///
    /// # Example
    /// ```no_run
    /// # use modfetch::FetchConfig;
    /// # use std::path::Path;
    /// let config = FetchConfig::from_file(Path::new("modfetch.toml")).unwrap();
    /// println!("Caching under {}", config.cache_root.display());
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_root.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "cache_root cannot be empty".to_string(),
            ));
        }

        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "api_base must be an http(s) URL: {}",
                self.api_base
            )));
        }

        Ok(())
    }

    /// Staleness window shared by all entries
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

impl FromStr for FetchConfig {
    type Err = ConfigError;

    /// Parse a config from a TOML string
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let mut config: FetchConfig = toml::from_str(content)?;
        config.api_base = config.api_base.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }
}
