//! HTTP client for the remote form service
//!
//! Three endpoints: GET `/form` for the schema, GET `/choice/{field}` for a
//! field's option list, POST `/save` for submission. GETs retry transient
//! failures with exponential backoff; the POST never auto-retries because a
//! duplicated save can duplicate server-side effects.

use crate::config::{FormConfig, RetryPolicy};
use crate::error::{LoadError, SubmitError};
use crate::schema::{self, ChoiceOption, Field};
use crate::service::traits::{FormService, SubmitResponse};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, warn};

/// Default form service address
const DEFAULT_SERVICE_URL: &str = "https://test.superhero.hu";

/// Environment variable overriding the service address
const SERVICE_URL_ENV: &str = "DYNFORM_SERVICE_URL";

/// Client for the remote form service
pub struct HttpFormService {
    /// Underlying HTTP client
    http: reqwest::Client,
    /// Service base URL
    base_url: Url,
    /// Retry tuning for the GET endpoints
    retry: RetryPolicy,
}

impl HttpFormService {
    /// Create a client against the configured address, honoring the
    /// `DYNFORM_SERVICE_URL` environment variable.
    pub fn new() -> Result<Self> {
        let address =
            std::env::var(SERVICE_URL_ENV).unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string());
        Self::with_url(&address)
    }

    /// Create a client against an explicit base URL
    pub fn with_url(address: &str) -> Result<Self> {
        let base_url =
            Url::parse(address).map_err(|e| anyhow!("invalid service URL {address}: {e}"))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            retry: RetryPolicy::default(),
        })
    }

    /// Create a client from user configuration. The config file's address
    /// wins over the environment variable; both fall back to the default.
    pub fn from_config(config: &FormConfig) -> Result<Self> {
        let address = config
            .service_url
            .clone()
            .or_else(|| std::env::var(SERVICE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());
        let mut service = Self::with_url(&address)?;
        service.retry = config.retry_policy();
        Ok(service)
    }

    /// Replace the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build an endpoint URL, percent-encoding each path segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url, LoadError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| LoadError::Transport("service URL cannot be a base".to_string()))?;
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, LoadError> {
        with_retry(&self.retry, || {
            let url = url.clone();
            async move {
                let response = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| LoadError::Transport(e.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status(status.as_u16()));
                }
                response
                    .json::<Value>()
                    .await
                    .map_err(|e| LoadError::Parse(e.to_string()))
            }
        })
        .await
    }
}

#[async_trait]
impl FormService for HttpFormService {
    async fn load_schema(&self) -> Result<Vec<Field>, LoadError> {
        let url = self.endpoint(&["form"])?;
        let body = self.get_json(url).await?;
        let fields = schema::parse_schema(&body).map_err(|e| LoadError::Parse(e.to_string()))?;
        debug!(count = fields.len(), "loaded form schema");
        Ok(fields)
    }

    async fn load_choices(&self, field_id: &str) -> Result<Vec<ChoiceOption>, LoadError> {
        let url = self.endpoint(&["choice", field_id])?;
        let body = self.get_json(url).await?;
        let options = schema::normalize_options(&body);
        debug!(field = field_id, count = options.len(), "loaded choice options");
        Ok(options)
    }

    async fn submit(&self, payload: &Value) -> Result<SubmitResponse, SubmitError> {
        let url = self
            .endpoint(&["save"])
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        let response = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Ok(SubmitResponse {
            status: status.as_u16(),
            ok: status.is_success(),
            body,
            sent: payload.clone(),
        })
    }
}

/// Run `operation` up to `policy.max_attempts` times, sleeping with
/// exponential backoff between attempts. Only retryable errors (transport
/// failures, 5xx) trigger another attempt.
pub(crate) async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, LoadError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LoadError>>,
{
    let mut backoff = policy.initial_backoff;
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_attempts && err.is_retryable() => {
                warn!(attempt, error = %err, "request failed, retrying");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
