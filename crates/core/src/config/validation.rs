//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, WorkerConfig};
use thiserror::Error;
use url::Url;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is set and outside 100ms..=5 minutes
    /// - `user_agent` is empty
    /// - any worker setting fails [`WorkerConfig::validate`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if let Some(timeout_ms) = self.timeout_ms {
            if timeout_ms < 100 {
                return Err(ConfigError::Invalid {
                    field: "timeout_ms".into(),
                    reason: "must be at least 100ms".into(),
                });
            }
            if timeout_ms > 300_000 {
                return Err(ConfigError::Invalid {
                    field: "timeout_ms".into(),
                    reason: "must not exceed 5 minutes (300000ms)".into(),
                });
            }
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        self.worker.validate()
    }
}

impl WorkerConfig {
    /// Validate the cache generation settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `version_tag` is blank
    /// - `scope` is not an absolute http(s) URL
    /// - `root`, `offline_document` or a manifest entry does not resolve against `scope`
    /// - a sync tag is blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version_tag.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "worker.version_tag".into(), reason: "must not be empty".into() });
        }

        let scope = self.scope_url()?;

        for (field, value) in [("worker.root", &self.root), ("worker.offline_document", &self.offline_document)] {
            scope
                .join(value)
                .map_err(|e| ConfigError::Invalid { field: field.into(), reason: e.to_string() })?;
        }

        for (idx, entry) in self.manifest.iter().enumerate() {
            if entry.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: format!("worker.manifest[{idx}]"),
                    reason: "must not be empty".into(),
                });
            }
            scope
                .join(entry.trim())
                .map_err(|e| ConfigError::Invalid { field: format!("worker.manifest[{idx}]"), reason: e.to_string() })?;
        }

        if self.sync.data_tag.is_empty() || self.sync.periodic_tag.is_empty() {
            return Err(ConfigError::Invalid { field: "worker.sync".into(), reason: "tags must not be empty".into() });
        }

        if self.notification.open_action.action == self.notification.dismiss_action.action {
            tracing::warn!(
                action = %self.notification.open_action.action,
                "open and dismiss notification actions share an id; clicks will always dismiss"
            );
        }

        Ok(())
    }

    /// Parsed worker scope.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the scope is not an absolute http(s) URL.
    pub fn scope_url(&self) -> Result<Url, ConfigError> {
        let scope = Url::parse(&self.scope)
            .map_err(|e| ConfigError::Invalid { field: "worker.scope".into(), reason: e.to_string() })?;

        match scope.scheme() {
            "http" | "https" => Ok(scope),
            other => Err(ConfigError::Invalid {
                field: "worker.scope".into(),
                reason: format!("unsupported scheme: {other}"),
            }),
        }
    }
}
