//! dynform - schema-driven form client core
//!
//! Fetches a field schema and per-field choice options from a remote form
//! service, holds user-edited values, validates them, and submits coerced
//! values back. Rendering is left to a view layer that reads the session
//! and dispatches edits into it.
//!
//! ```no_run
//! use dynform::{FormSession, HttpFormService};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let service = HttpFormService::new()?;
//! let mut session = FormSession::new(service);
//! session.load().await?;
//! session.set_value("name", "Ada");
//! if session.can_submit() {
//!     let response = session.submit().await?;
//!     println!("saved: {}", response.status);
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod payload;
mod schema;
mod service;
mod session;
mod validate;

pub use config::{FormConfig, RetryPolicy};
pub use error::{LoadError, SubmitError};
pub use payload::build_payload;
pub use schema::{normalize_option, normalize_options, parse_schema, ChoiceOption, Field, Widget};
pub use service::{FormService, HttpFormService, SubmitResponse};
pub use session::{FormSession, SubmissionState};
pub use validate::{field_is_valid, form_is_valid, is_integer_literal};
