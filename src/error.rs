//! Error types for figma-dl
//!
//! The taxonomy mirrors how failures propagate through a run:
//! - Configuration errors are fatal and surface before any I/O
//! - Transport errors (document fetch, either resolution call) are fatal to
//!   the call that raised them and propagate to the caller
//! - Everything else (per-id misses, filtered references, per-image download
//!   failures) degrades to "fewer results than expected" plus a diagnostic
//!   and never appears as an `Error`

use thiserror::Error;

/// Result type alias for figma-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for figma-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "FIGMA_API_TOKEN")
        key: Option<String>,
    },

    /// Network or HTTP-client error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success HTTP status
    #[error("API request failed with HTTP {status}: {url}")]
    Api {
        /// HTTP status code returned by the server
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// Response body could not be deserialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Configuration error for a missing required environment variable
    pub fn missing_env(key: &str) -> Self {
        Self::Config {
            message: format!("required environment variable {key} is not set"),
            key: Some(key.to_string()),
        }
    }

    /// True for transport-level failures (network or non-2xx status).
    ///
    /// These are the only errors allowed to terminate a resolution path;
    /// callers use this to distinguish them from local failures in logs.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Api { .. })
    }
}
