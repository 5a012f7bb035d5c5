//! Configuration types for figma-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default Figma REST API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.figma.com/v1";

/// API access configuration (token, target file, endpoint)
///
/// Groups settings related to the remote API. Used as a nested sub-config
/// within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Personal access token sent as `X-Figma-Token` on every request
    #[serde(default)]
    pub api_token: String,

    /// Key of the document to process
    #[serde(default)]
    pub file_key: String,

    /// API base URL (default: the public Figma API; overridable for testing)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for document fetch and export resolution calls (default: 30s)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            file_key: String::new(),
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Download behavior configuration (output directory, timeouts, concurrency)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory image files are written to (default: "downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Per-image download timeout (default: 30s)
    ///
    /// This is the only operation with an explicit timeout; a download that
    /// exceeds it is recorded as a failed item, not a run failure.
    #[serde(default = "default_download_timeout")]
    pub download_timeout: Duration,

    /// Maximum concurrent image downloads (default: 1)
    ///
    /// The default reproduces strictly sequential downloads. Values above 1
    /// are safe: counters are aggregated by a single consumer and filename
    /// collision handling is race-free.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_downloads: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            download_timeout: default_download_timeout(),
            max_concurrent_downloads: default_max_concurrent(),
        }
    }
}

/// Main configuration for [`FigmaDownloader`](crate::FigmaDownloader)
///
/// Sub-config fields are flattened for serialization, so the JSON/TOML
/// format stays flat (no nesting).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// API access settings (token, file key, endpoint)
    #[serde(flatten)]
    pub api: ApiConfig,

    /// Download behavior settings (directory, timeout, concurrency)
    #[serde(flatten)]
    pub download: DownloadConfig,
}

impl Config {
    /// Build a configuration from process environment variables.
    ///
    /// Reads:
    /// - `FIGMA_API_TOKEN` (required)
    /// - `FIGMA_FILE_KEY` (required)
    /// - `DOWNLOAD_PATH` (optional, default `downloads`)
    /// - `FIGMA_API_BASE_URL` (optional, primarily for testing)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending variable when a
    /// required value is missing or empty. This is checked before any
    /// network call is made.
    pub fn from_env() -> Result<Self> {
        let api_token = require_env("FIGMA_API_TOKEN")?;
        let file_key = require_env("FIGMA_FILE_KEY")?;

        let mut config = Config {
            api: ApiConfig {
                api_token,
                file_key,
                ..ApiConfig::default()
            },
            download: DownloadConfig::default(),
        };

        if let Ok(dir) = std::env::var("DOWNLOAD_PATH")
            && !dir.is_empty()
        {
            config.download.download_dir = PathBuf::from(dir);
        }
        if let Ok(base) = std::env::var("FIGMA_API_BASE_URL")
            && !base.is_empty()
        {
            config.api.base_url = base;
        }

        Ok(config)
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token or file key is empty.
    pub fn validate(&self) -> Result<()> {
        if self.api.api_token.is_empty() {
            return Err(Error::Config {
                message: "API token must not be empty".to_string(),
                key: Some("api_token".to_string()),
            });
        }
        if self.api.file_key.is_empty() {
            return Err(Error::Config {
                message: "file key must not be empty".to_string(),
                key: Some("file_key".to_string()),
            });
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::missing_env(key)),
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_download_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_concurrent() -> usize {
    1
}
