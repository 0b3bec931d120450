//! Runtime configuration for the chart and its backend.

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "Dental Chart";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base URL of the clinic API started by the desktop shell.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variables read by [`ChartConfig::from_env`].
pub const ENV_API_URL: &str = "DENTAL_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "DENTAL_API_TIMEOUT_SECS";
pub const ENV_RESELECT_POLICY: &str = "DENTAL_RESELECT_POLICY";

/// Default `tracing` filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,dental_chart_core=debug,dental_chart_shell=debug"
}

/// What happens when a tooth is selected while another edit is open.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReselectPolicy {
    /// Drop the open edit, report it to the caller and log a warning
    #[default]
    DiscardAndWarn,
    /// Refuse the selection until the open edit is committed or cancelled
    Block,
}

impl ReselectPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "discard_and_warn" | "discard" => Some(ReselectPolicy::DiscardAndWarn),
            "block" => Some(ReselectPolicy::Block),
            _ => None,
        }
    }
}

/// Chart configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    /// Base URL of the REST API, e.g. `http://localhost:5000/api`
    pub api_base_url: String,
    /// Per-request timeout for backend calls
    pub request_timeout_secs: u64,
    /// Re-selection behaviour while editing
    pub reselect_policy: ReselectPolicy,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            reselect_policy: ReselectPolicy::default(),
        }
    }
}

impl ChartConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup (the environment, in production).
    ///
    /// Unparseable values are logged and ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "Ignoring invalid {}", ENV_TIMEOUT_SECS),
            }
        }

        if let Some(raw) = lookup(ENV_RESELECT_POLICY) {
            match ReselectPolicy::parse(&raw) {
                Some(policy) => self.reselect_policy = policy,
                None => tracing::warn!(value = %raw, "Ignoring invalid {}", ENV_RESELECT_POLICY),
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ChartConfig::default();
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.reselect_policy, ReselectPolicy::DiscardAndWarn);
    }

    #[test]
    fn test_partial_json() {
        let config = ChartConfig::from_json(r#"{"reselect_policy": "block"}"#).unwrap();
        assert_eq!(config.reselect_policy, ReselectPolicy::Block);
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "http://clinic.local:8080/api"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_RESELECT_POLICY, "BLOCK"),
        ]
        .into_iter()
        .collect();

        let config =
            ChartConfig::default().with_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "http://clinic.local:8080/api");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.reselect_policy, ReselectPolicy::Block);
    }

    #[test]
    fn test_invalid_overrides_ignored() {
        let config = ChartConfig::default().with_overrides(|key| match key {
            ENV_TIMEOUT_SECS => Some("soon".into()),
            ENV_RESELECT_POLICY => Some("maybe".into()),
            ENV_API_URL => Some("   ".into()),
            _ => None,
        });
        assert_eq!(config, ChartConfig::default());
    }

    #[test]
    fn test_app_name() {
        assert_eq!(APP_NAME, "Dental Chart");
    }
}
