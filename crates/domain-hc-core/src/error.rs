//! Error types for the domain monitoring system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for domain-hc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the domain monitoring system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal, detected before any work starts)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Registry file errors (I/O on the domain file)
    #[error("Registry error: {0}")]
    Registry(String),

    /// The remote check service is unreachable or rejected the request
    #[error("Remote service unavailable: {0}")]
    RemoteUnavailable(String),

    /// The remote API answered with an unexpected response shape
    #[error("Unexpected API response: {0}")]
    Schema(String),

    /// WHOIS lookup errors (always recovered locally by the engine)
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// Marker store errors
    #[error("Marker store error: {0}")]
    MarkerStore(String),

    /// Underlying I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a registry error
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Create a remote-service error
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::RemoteUnavailable(msg.into())
    }

    /// Create a schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a lookup error
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Create a marker store error
    pub fn marker_store(msg: impl Into<String>) -> Self {
        Self::MarkerStore(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
