//! Error taxonomy for the ApplyMate client.
//!
//! Three families: `Validation` is detected locally before any network I/O,
//! `Transport` is a failed or timed-out connection, `Api` is a non-2xx
//! response from the backend. Stale responses and busy-rejections are not
//! errors; they surface as `StepResult` values from the workflow instead.

use thiserror::Error;

/// Errors surfaced by the repository, the API client, and the orchestrator.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Client-detected invalid input. No network call was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// Network failure, DNS error, or timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx response from the backend.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// True when retrying the same call could plausibly succeed.
    ///
    /// Transport failures and 5xx responses are retryable; validation errors
    /// and 4xx responses are not. The client performs no automatic retries;
    /// this exists so a caller can build its own policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) => false,
            Self::Transport(_) => true,
            Self::Api { status, .. } => *status >= 500,
        }
    }

    /// True for locally-detected validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
