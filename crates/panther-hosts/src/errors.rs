//! Host directory error types.

use thiserror::Error;

/// Errors from host directory requests.
#[derive(Debug, Error)]
pub enum HostError {
    /// A request needed a host name and got an empty one.
    #[error("host name was not specified")]
    MissingName,

    /// The request could not be sent or the response not read.
    #[error("host request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("host request rejected ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server's plain-text message, trimmed.
        message: String,
    },

    /// The response body was not the expected JSON.
    #[error("invalid host response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl HostError {
    /// HTTP status for rejected requests.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// An ordered batch delete stopped at its first failure.
#[derive(Debug, Error)]
#[error("deleted {deleted} host(s) before '{name}' failed: {source}")]
pub struct BatchDeleteError {
    /// Hosts deleted before the failure.
    pub deleted: usize,
    /// The host whose deletion failed.
    pub name: String,
    /// Why it failed.
    #[source]
    pub source: HostError,
}

/// Result type for host directory operations.
pub type Result<T> = std::result::Result<T, HostError>;
