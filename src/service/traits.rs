//! Trait abstraction for the form service to enable mocking in tests

use crate::error::{LoadError, SubmitError};
use crate::schema::{ChoiceOption, Field};
use async_trait::async_trait;
use serde_json::Value;

/// Outcome of a submission that reached the server.
///
/// The HTTP status is authoritative for success; `body` degrades to an
/// empty object when the response is unparsable, and `sent` echoes the
/// exact payload for the view's confirmation display.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitResponse {
    /// HTTP status code of the save response
    pub status: u16,
    /// Whether the status was in the 2xx range
    pub ok: bool,
    /// Parsed response body, or an empty object
    pub body: Value,
    /// Echo of the payload that was sent
    pub sent: Value,
}

/// Trait for form service operations, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormService: Send + Sync {
    /// Fetch and normalize the field schema
    async fn load_schema(&self) -> Result<Vec<Field>, LoadError>;

    /// Fetch and normalize the option list for one choice field
    async fn load_choices(&self, field_id: &str) -> Result<Vec<ChoiceOption>, LoadError>;

    /// POST the collected values to the save endpoint
    async fn submit(&self, payload: &Value) -> Result<SubmitResponse, SubmitError>;
}
