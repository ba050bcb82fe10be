//! Error types for the DDNS updater
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing token, missing domain, bad values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Every external IP lookup service failed or returned garbage
    #[error("Unable to determine external IP from any service")]
    NoIpAvailable,

    /// No zone matched the configured domain
    #[error("Domain {0} not found in Cloudflare account")]
    ZoneNotFound(String),

    /// No DNS record matched the configured name and type
    #[error("DNS record {name} ({record_type}) not found in Cloudflare")]
    RecordNotFound {
        /// Fully-qualified record name
        name: String,
        /// Record type (e.g. "A")
        record_type: String,
    },

    /// Non-2xx response from the provider API
    #[error("Cloudflare API error ({status}): {message}")]
    ProviderApi {
        /// HTTP status code
        status: u16,
        /// Provider error messages, or the raw body
        message: String,
    },

    /// Provider answered 2xx but reported the update as unsuccessful
    #[error("Failed to update DNS record: {0}")]
    UpdateFailed(String),

    /// State store errors (only writes surface this)
    #[error("State store error: {0}")]
    StateStore(String),

    /// Transport-level HTTP failures (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a "zone not found" error
    pub fn zone_not_found(domain: impl Into<String>) -> Self {
        Self::ZoneNotFound(domain.into())
    }

    /// Create a "record not found" error
    pub fn record_not_found(name: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self::RecordNotFound {
            name: name.into(),
            record_type: record_type.into(),
        }
    }

    /// Create a provider API error
    pub fn provider_api(status: u16, message: impl Into<String>) -> Self {
        Self::ProviderApi {
            status,
            message: message.into(),
        }
    }

    /// Create an "update failed" error
    pub fn update_failed(msg: impl Into<String>) -> Self {
        Self::UpdateFailed(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Whether this error means identifier resolution failed
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::ZoneNotFound(_) | Self::RecordNotFound { .. })
    }
}
