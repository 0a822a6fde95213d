//! Board source error types.

use crate::domain::StopId;

use super::extract::ExtractError;

/// Errors from fetching or reading a departure board.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// HTTP request failed (network error, timeout, broken body stream)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The operator has no board for this stop
    #[error("stop not found: {0}")]
    StopNotFound(StopId),

    /// The operator refused access (401 or 403)
    #[error("upstream refused access ({status})")]
    Refused { status: u16 },

    /// The operator asked us to slow down (429)
    #[error("rate limited by upstream")]
    RateLimited,

    /// The operator returned a non-success status
    #[error("upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The configured base URL cannot carry a stop path
    #[error("invalid board URL: {0}")]
    InvalidUrl(String),

    /// Reading a fixture board failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The markup tokenizer failed
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// The extraction task panicked or was cancelled
    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
