//! Error types for the announcer
//!
//! Each collaborator has its own error enum (`FetchError`, `StoreError`,
//! `PublishError`) so callers can decide per failure class whether to log,
//! degrade, or answer the user. `AnnouncerError` covers process-level
//! failures such as configuration and I/O.

use thiserror::Error;

/// Process-level error type
#[derive(Error, Debug)]
pub enum AnnouncerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised while fetching events from the event API
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure (DNS, connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Event API returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body was not a valid list of events
    #[error("Failed to parse events: {0}")]
    Parse(String),
}

/// Errors raised by the watermark store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached or the URL was invalid
    #[error("Store connection error: {0}")]
    Connection(String),

    /// A GET or SET failed
    #[error("Store command error: {0}")]
    Command(String),

    /// The stored value is not an epoch-millisecond integer
    #[error("Invalid watermark value: {0}")]
    InvalidValue(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

/// Errors raised while delivering a chat message
#[derive(Error, Debug)]
pub enum PublishError {
    /// Transport failure talking to the chat platform
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The chat platform rejected the message
    #[error("Chat API error: {error}")]
    Api {
        /// Error code reported by the platform
        error: String,
    },
}

/// Result type alias for application-level operations
///
/// Uses `anyhow::Error` so the typed errors above can be propagated with
/// context from the command handlers up to `main`.
pub type Result<T> = anyhow::Result<T>;
