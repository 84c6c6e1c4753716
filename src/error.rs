//! Error types for schema loading and submission

use thiserror::Error;

/// Failure while fetching the form schema or a field's choice options
#[derive(Debug, Error)]
pub enum LoadError {
    /// The service answered with a non-success HTTP status
    #[error("form service returned status {0}")]
    Status(u16),
    /// The response body could not be parsed as JSON
    #[error("failed to parse response body: {0}")]
    Parse(String),
    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(String),
}

impl LoadError {
    /// Whether a retry has any chance of succeeding.
    ///
    /// Transport failures and server-side errors are transient; client
    /// errors and parse failures are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoadError::Transport(_) | LoadError::Status(500..=599))
    }
}

/// Failure while submitting the form
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The POST never produced a response
    #[error("transport error: {0}")]
    Transport(String),
    /// The form is invalid or a submission is already in flight
    #[error("form is not ready to submit")]
    NotReady,
}
