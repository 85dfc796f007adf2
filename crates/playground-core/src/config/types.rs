//! Configuration type definitions for the playground console.
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://playground.substrate.dev"
//! request_timeout_ms = 10000
//!
//! [polling]
//! admin_interval_secs = 5
//! session_interval_secs = 1
//!
//! [instance]
//! max_retries = 300
//! retry_delay_ms = 1000
//! probe_timeout_ms = 3000
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration loaded from TOML config files.
///
/// Loaded from:
/// 1. User config: `~/.playground/config.toml`
/// 2. Project config: `./.playground/config.toml`
///
/// Project config values override user config values.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PlaygroundConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub instance: InstanceConfig,
}

/// Backend API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ApiConfig {
    /// Root URL of the playground backend. `/api/...` is appended per request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

/// Intervals for the snapshot pollers.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PollingConfig {
    /// Admin dashboard refresh (sessions, users, templates, details).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_interval_secs: Option<u64>,

    /// Current-session refresh on the session panel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_interval_secs: Option<u64>,
}

/// Instance readiness settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct InstanceConfig {
    /// Unresolved checks tolerated before giving up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay_ms: Option<u64>,

    /// Timeout for a single reachability probe of the instance URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_timeout_ms: Option<u64>,
}

impl PlaygroundConfig {
    pub fn base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(super::defaults::DEFAULT_BASE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(
            self.api
                .request_timeout_ms
                .unwrap_or(super::defaults::DEFAULT_REQUEST_TIMEOUT_MS),
        )
    }

    pub fn admin_interval(&self) -> Duration {
        Duration::from_secs(
            self.polling
                .admin_interval_secs
                .unwrap_or(super::defaults::DEFAULT_ADMIN_INTERVAL_SECS),
        )
    }

    pub fn session_interval(&self) -> Duration {
        Duration::from_secs(
            self.polling
                .session_interval_secs
                .unwrap_or(super::defaults::DEFAULT_SESSION_INTERVAL_SECS),
        )
    }

    pub fn max_retries(&self) -> u32 {
        self.instance
            .max_retries
            .unwrap_or(super::defaults::DEFAULT_MAX_RETRIES)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(
            self.instance
                .retry_delay_ms
                .unwrap_or(super::defaults::DEFAULT_RETRY_DELAY_MS),
        )
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(
            self.instance
                .probe_timeout_ms
                .unwrap_or(super::defaults::DEFAULT_PROBE_TIMEOUT_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: PlaygroundConfig = toml::from_str("").unwrap();
        assert_eq!(config, PlaygroundConfig::default());
        assert_eq!(config.max_retries(), 300);
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.admin_interval(), Duration::from_secs(5));
        assert_eq!(config.session_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_toml_overrides_only_given_fields() {
        let config: PlaygroundConfig = toml::from_str(
            r#"
            [api]
            base_url = "http://localhost:9944"

            [instance]
            max_retries = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url(), "http://localhost:9944");
        assert_eq!(config.max_retries(), 10);
        assert_eq!(config.probe_timeout(), Duration::from_millis(3000));
    }
}
