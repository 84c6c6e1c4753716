//! Configuration handling for the form client

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Retry tuning for schema and choice fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Sleep before the first retry; doubles on each further retry
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(250),
        }
    }
}

/// User configuration for the form client
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FormConfig {
    /// Form service base URL
    pub service_url: Option<String>,
    /// Total attempts per GET, including the first
    pub retry_max_attempts: Option<u32>,
    /// Initial retry backoff in milliseconds
    pub retry_initial_backoff_ms: Option<u64>,
    /// Allow submitting again after a successful submission
    pub allow_resubmit: Option<bool>,
    /// Pre-select the first option of an unset choice field
    pub auto_select_first_option: Option<bool>,
}

impl FormConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "dynform", "dynform")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if let Some(path) = path {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let config: FormConfig = serde_json::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    /// Retry policy with defaults filled in
    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.retry_max_attempts.unwrap_or(defaults.max_attempts),
            initial_backoff: self
                .retry_initial_backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.initial_backoff),
        }
    }

    /// Whether a form may be submitted again after a success (default: no)
    pub fn resubmit_allowed(&self) -> bool {
        self.allow_resubmit.unwrap_or(false)
    }

    /// Whether unset choice fields default to their first option (default: yes)
    pub fn auto_select_enabled(&self) -> bool {
        self.auto_select_first_option.unwrap_or(true)
    }
}
