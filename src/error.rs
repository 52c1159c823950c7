//! Error taxonomy for the sync pipeline.
//!
//! Every fallible operation returns [`SyncError`]. The run loop never lets a
//! per-feed error escape its own iteration; only [`SyncError::Config`] stops a
//! run before any feed is processed.

use thiserror::Error;

/// The error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing credential or an unusable feed configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The HTTP request to the search endpoint failed.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The search endpoint answered with a non-success status.
    #[error("unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The request URL, without its query string.
        url: String,
    },

    /// The search service reported an error in its response body.
    #[error("search API error: {0}")]
    Api(String),

    /// The response body was not the JSON document we expected.
    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Reading or writing a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A history file could not be read or written as CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Staging, committing or pushing the update failed.
    #[error("publish error: {0}")]
    Publish(String),
}

/// Coarse failure category, used as a structured log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Transport,
    Io,
    Publish,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "ConfigError",
            ErrorKind::Transport => "TransportError",
            ErrorKind::Io => "IOError",
            ErrorKind::Publish => "PublishError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SyncError {
    /// The failure category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Config(_) => ErrorKind::Config,
            SyncError::Transport(_)
            | SyncError::Status { .. }
            | SyncError::Api(_)
            | SyncError::Decode(_) => ErrorKind::Transport,
            SyncError::Io(_) | SyncError::Csv(_) => ErrorKind::Io,
            SyncError::Publish(_) => ErrorKind::Publish,
        }
    }
}
