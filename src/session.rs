//! Form session: values, submission lifecycle, and orchestration
//!
//! A session owns one form's lifetime: load the schema once, collect edits
//! from the view layer, and submit when the gate allows. The service behind
//! it is abstracted so the whole flow is testable without a network.

use crate::config::FormConfig;
use crate::error::{LoadError, SubmitError};
use crate::payload::build_payload;
use crate::schema::{ChoiceOption, Field, Widget};
use crate::service::{FormService, SubmitResponse};
use crate::validate;
use std::collections::HashMap;
use tracing::{debug, error, warn};

/// Submission lifecycle of a form session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// A submission is in flight
    Submitting,
    /// The server accepted a submission
    Sent,
    /// The last submission failed; a retry is permitted
    Failed(String),
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionState::Submitting)
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, SubmissionState::Sent)
    }

    /// Reason of the last failure, if any
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            SubmissionState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// One form's state against a form service
pub struct FormSession<S> {
    /// Service the schema, options and submission go through
    service: S,
    /// Ordered field schema; empty until `load` succeeds
    fields: Vec<Field>,
    /// Current raw value per field id
    values: HashMap<String, String>,
    /// Normalized options per choice field id
    options: HashMap<String, Vec<ChoiceOption>>,
    /// Submission lifecycle
    submission: SubmissionState,
    /// Allow submitting again after a success
    allow_resubmit: bool,
    /// Default unset choice fields to their first option after load
    auto_select_first_option: bool,
}

impl<S: FormService> FormSession<S> {
    /// Create a session with default policy: resubmission blocked,
    /// first-option auto-select on.
    pub fn new(service: S) -> Self {
        Self {
            service,
            fields: Vec::new(),
            values: HashMap::new(),
            options: HashMap::new(),
            submission: SubmissionState::Idle,
            allow_resubmit: false,
            auto_select_first_option: true,
        }
    }

    /// Create a session with policy flags taken from user configuration
    pub fn with_config(service: S, config: &FormConfig) -> Self {
        let mut session = Self::new(service);
        session.allow_resubmit = config.resubmit_allowed();
        session.auto_select_first_option = config.auto_select_enabled();
        session
    }

    /// Load the schema and every choice field's options.
    ///
    /// On success every field id has a value entry (initially empty) and
    /// every choice field has an options entry. A failed options fetch
    /// degrades that one field to zero options; only a failed schema fetch
    /// aborts the load.
    pub async fn load(&mut self) -> Result<(), LoadError> {
        let fields = self.service.load_schema().await?;
        debug!(count = fields.len(), "form schema loaded");

        let mut values = HashMap::new();
        for field in &fields {
            values.insert(field.id.clone(), String::new());
        }
        self.fields = fields;
        self.values = values;

        self.options = self.load_all_choices().await;
        if self.auto_select_first_option {
            self.apply_default_selections();
        }
        Ok(())
    }

    /// Fetch options for every choice field, isolating per-field failures.
    /// The aggregate map is only installed once all fields have settled.
    async fn load_all_choices(&self) -> HashMap<String, Vec<ChoiceOption>> {
        let mut all = HashMap::new();
        for field in self.fields.iter().filter(|f| f.widget == Widget::Choice) {
            match self.service.load_choices(&field.id).await {
                Ok(options) => {
                    all.insert(field.id.clone(), options);
                }
                Err(err) => {
                    warn!(field = %field.id, error = %err, "choice options fetch failed");
                    all.insert(field.id.clone(), Vec::new());
                }
            }
        }
        all
    }

    fn apply_default_selections(&mut self) {
        for field in &self.fields {
            if field.widget != Widget::Choice {
                continue;
            }
            let unset = self
                .values
                .get(&field.id)
                .is_none_or(|value| value.is_empty());
            if !unset {
                continue;
            }
            if let Some(first) = self.options.get(&field.id).and_then(|opts| opts.first()) {
                self.values.insert(field.id.clone(), first.value_string());
            }
        }
    }

    /// Overwrite one field's raw value. No coercion, no validation; validity
    /// is recomputed by the caller through `is_valid`.
    pub fn set_value(&mut self, field_id: &str, value: impl Into<String>) {
        self.values.insert(field_id.to_string(), value.into());
    }

    /// Current raw value of a field
    pub fn value(&self, field_id: &str) -> Option<&str> {
        self.values.get(field_id).map(String::as_str)
    }

    /// The loaded schema in render/submit order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Options for one choice field; empty when unavailable
    pub fn options(&self, field_id: &str) -> &[ChoiceOption] {
        self.options.get(field_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Current submission lifecycle state
    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    /// Whether every field currently passes validation
    pub fn is_valid(&self) -> bool {
        validate::form_is_valid(&self.fields, &self.values)
    }

    /// Whether the submit gate is open: valid form, nothing in flight, and
    /// (unless resubmission is allowed) not already sent.
    pub fn can_submit(&self) -> bool {
        if !self.is_valid() {
            return false;
        }
        match self.submission {
            SubmissionState::Submitting => false,
            SubmissionState::Sent => self.allow_resubmit,
            _ => true,
        }
    }

    /// Submit the collected values.
    ///
    /// Fails fast with `SubmitError::NotReady` when the gate is closed,
    /// without touching the network or the lifecycle state. A response from
    /// the server always comes back `Ok`; its status decides whether the
    /// session moves to `Sent` or `Failed`.
    pub async fn submit(&mut self) -> Result<SubmitResponse, SubmitError> {
        if !self.can_submit() {
            return Err(SubmitError::NotReady);
        }
        self.submission = SubmissionState::Submitting;

        let payload = build_payload(&self.fields, &self.values);
        match self.service.submit(&payload).await {
            Ok(response) => {
                if response.ok {
                    debug!(status = response.status, "form submitted");
                    self.submission = SubmissionState::Sent;
                } else {
                    warn!(status = response.status, "form submission rejected");
                    self.submission = SubmissionState::Failed(format!(
                        "form service returned status {}",
                        response.status
                    ));
                }
                Ok(response)
            }
            Err(err) => {
                error!(error = %err, "form submission failed");
                self.submission = SubmissionState::Failed(err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockFormService;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn text_field(id: &str) -> Field {
        Field::new(id, id, Widget::Text)
    }

    fn choice_field(id: &str) -> Field {
        Field::new(id, id, Widget::Choice)
    }

    fn option(label: &str) -> ChoiceOption {
        ChoiceOption {
            label: label.to_string(),
            value: json!(label),
        }
    }

    fn accepting_submit(mock: &mut MockFormService) {
        mock.expect_submit().returning(|payload| {
            Ok(SubmitResponse {
                status: 200,
                ok: true,
                body: json!({"saved": true}),
                sent: payload.clone(),
            })
        });
    }

    mod loading {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_load_initializes_values_to_empty() {
            let mut mock = MockFormService::new();
            mock.expect_load_schema()
                .returning(|| Ok(vec![text_field("name"), text_field("city")]));
            mock.expect_load_choices().never();

            let mut session = FormSession::new(mock);
            session.load().await.unwrap();

            assert_eq!(session.fields().len(), 2);
            assert_eq!(session.value("name"), Some(""));
            assert_eq!(session.value("city"), Some(""));
            assert!(!session.is_valid());
        }

        #[tokio::test]
        async fn test_schema_error_leaves_session_empty() {
            let mut mock = MockFormService::new();
            mock.expect_load_schema()
                .returning(|| Err(LoadError::Status(500)));
            mock.expect_load_choices().never();

            let mut session = FormSession::new(mock);
            let err = session.load().await.unwrap_err();

            assert!(err.to_string().contains("500"));
            assert!(session.fields().is_empty());
            assert!(!session.is_valid());
        }

        #[tokio::test]
        async fn test_choice_failure_is_isolated_per_field() {
            let mut mock = MockFormService::new();
            mock.expect_load_schema()
                .returning(|| Ok(vec![choice_field("color"), choice_field("size")]));
            mock.expect_load_choices()
                .withf(|id| id == "color")
                .returning(|_| Ok(vec![option("red"), option("blue")]));
            mock.expect_load_choices()
                .withf(|id| id == "size")
                .returning(|_| Err(LoadError::Transport("connection reset".to_string())));

            let mut session = FormSession::new(mock);
            session.load().await.unwrap();

            assert_eq!(session.options("color").len(), 2);
            assert!(session.options("size").is_empty());
        }

        #[tokio::test]
        async fn test_auto_select_defaults_unset_choice_fields() {
            let mut mock = MockFormService::new();
            mock.expect_load_schema()
                .returning(|| Ok(vec![choice_field("color")]));
            mock.expect_load_choices()
                .returning(|_| Ok(vec![option("red"), option("blue")]));

            let mut session = FormSession::new(mock);
            session.load().await.unwrap();

            assert_eq!(session.value("color"), Some("red"));
            assert!(session.is_valid());
        }

        #[tokio::test]
        async fn test_auto_select_can_be_disabled() {
            let mut mock = MockFormService::new();
            mock.expect_load_schema()
                .returning(|| Ok(vec![choice_field("color")]));
            mock.expect_load_choices()
                .returning(|_| Ok(vec![option("red")]));

            let config = FormConfig {
                auto_select_first_option: Some(false),
                ..Default::default()
            };
            let mut session = FormSession::with_config(mock, &config);
            session.load().await.unwrap();

            assert_eq!(session.value("color"), Some(""));
            assert!(!session.is_valid());
        }

        #[tokio::test]
        async fn test_no_choice_fields_means_no_choice_calls() {
            let mut mock = MockFormService::new();
            mock.expect_load_schema()
                .returning(|| Ok(vec![text_field("name")]));
            mock.expect_load_choices().never();

            let mut session = FormSession::new(mock);
            session.load().await.unwrap();
            assert!(session.options("name").is_empty());
        }

        #[tokio::test]
        async fn test_numeric_option_value_becomes_string() {
            let mut mock = MockFormService::new();
            mock.expect_load_schema()
                .returning(|| Ok(vec![choice_field("rank")]));
            mock.expect_load_choices().returning(|_| {
                Ok(vec![ChoiceOption {
                    label: "first".to_string(),
                    value: json!(1),
                }])
            });

            let mut session = FormSession::new(mock);
            session.load().await.unwrap();
            assert_eq!(session.value("rank"), Some("1"));
        }
    }

    mod editing {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_set_value_drives_validity() {
            let mut mock = MockFormService::new();
            mock.expect_load_schema()
                .returning(|| Ok(vec![text_field("name"), Field::new("age", "age", Widget::Integer)]));

            let mut session = FormSession::new(mock);
            session.load().await.unwrap();
            assert!(!session.is_valid());

            session.set_value("name", "Ada");
            session.set_value("age", "3.5");
            assert!(!session.is_valid());

            session.set_value("age", "36");
            assert!(session.is_valid());
        }

        #[test]
        fn test_set_value_is_a_raw_overwrite() {
            let mut session = FormSession::new(MockFormService::new());
            session.set_value("age", "  007 ");
            assert_eq!(session.value("age"), Some("  007 "));
        }
    }

    mod submitting {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_successful_submit_lifecycle() {
            let mut mock = MockFormService::new();
            mock.expect_load_schema()
                .returning(|| Ok(vec![text_field("name"), Field::new("age", "age", Widget::Integer)]));
            accepting_submit(&mut mock);

            let mut session = FormSession::new(mock);
            session.load().await.unwrap();
            assert_eq!(*session.submission(), SubmissionState::Idle);

            session.set_value("name", "Ada");
            session.set_value("age", "42");
            assert!(session.can_submit());

            let response = session.submit().await.unwrap();
            assert!(response.ok);
            assert_eq!(response.status, 200);
            assert_eq!(response.sent, json!({"name": "Ada", "age": 42}));
            assert!(session.submission().is_sent());
            // sent is terminal under the default policy
            assert!(!session.can_submit());
        }

        #[tokio::test]
        async fn test_invalid_form_is_rejected_without_network() {
            let mut mock = MockFormService::new();
            mock.expect_load_schema()
                .returning(|| Ok(vec![text_field("name")]));
            mock.expect_submit().never();

            let mut session = FormSession::new(mock);
            session.load().await.unwrap();

            let err = session.submit().await.unwrap_err();
            assert!(matches!(err, SubmitError::NotReady));
            assert_eq!(*session.submission(), SubmissionState::Idle);
        }

        #[tokio::test]
        async fn test_transport_failure_permits_retry() {
            let mut mock = MockFormService::new();
            mock.expect_load_schema()
                .returning(|| Ok(vec![text_field("name")]));
            mock.expect_submit()
                .times(1)
                .returning(|_| Err(SubmitError::Transport("connection reset".to_string())));

            let mut session = FormSession::new(mock);
            session.load().await.unwrap();
            session.set_value("name", "Ada");

            let err = session.submit().await.unwrap_err();
            assert!(err.to_string().contains("connection reset"));
            assert_eq!(
                session.submission().failure_reason(),
                Some("transport error: connection reset")
            );
            assert!(session.can_submit());
        }

        #[tokio::test]
        async fn test_rejected_submit_is_a_failed_state_not_an_error() {
            let mut mock = MockFormService::new();
            mock.expect_load_schema()
                .returning(|| Ok(vec![text_field("name")]));
            mock.expect_submit().returning(|payload| {
                Ok(SubmitResponse {
                    status: 422,
                    ok: false,
                    body: json!({"error": "nope"}),
                    sent: payload.clone(),
                })
            });

            let mut session = FormSession::new(mock);
            session.load().await.unwrap();
            session.set_value("name", "Ada");

            let response = session.submit().await.unwrap();
            assert!(!response.ok);
            assert!(session
                .submission()
                .failure_reason()
                .is_some_and(|reason| reason.contains("422")));
            assert!(session.can_submit());
        }

        #[tokio::test]
        async fn test_resubmission_allowed_by_config() {
            let mut mock = MockFormService::new();
            mock.expect_load_schema()
                .returning(|| Ok(vec![text_field("name")]));
            accepting_submit(&mut mock);

            let config = FormConfig {
                allow_resubmit: Some(true),
                ..Default::default()
            };
            let mut session = FormSession::with_config(mock, &config);
            session.load().await.unwrap();
            session.set_value("name", "Ada");

            session.submit().await.unwrap();
            assert!(session.submission().is_sent());
            assert!(session.can_submit());
            session.submit().await.unwrap();
            assert!(session.submission().is_sent());
        }

        #[tokio::test]
        async fn test_malformed_integer_passes_through_when_gate_is_open() {
            // The Other widget validates like text, so a non-integer string
            // can legitimately reach the payload unchanged.
            let mut mock = MockFormService::new();
            mock.expect_load_schema()
                .returning(|| Ok(vec![Field::new("code", "code", Widget::Other)]));
            accepting_submit(&mut mock);

            let mut session = FormSession::new(mock);
            session.load().await.unwrap();
            session.set_value("code", "abc");

            let response = session.submit().await.unwrap();
            assert_eq!(response.sent, json!({"code": "abc"}));
        }
    }
}
