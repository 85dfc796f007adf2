use crate::config::types::PlaygroundConfig;
use crate::errors::ConfigError;

/// Validate a merged configuration.
///
/// Intervals and timeouts must be non-zero so pollers never busy-loop, and the
/// base URL must parse as an absolute URL.
pub fn validate_config(config: &PlaygroundConfig) -> Result<(), ConfigError> {
    let base_url = config.base_url();
    url::Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
        url: base_url.to_string(),
        message: e.to_string(),
    })?;

    let non_zero = [
        ("api.request_timeout_ms", config.api.request_timeout_ms),
        (
            "polling.admin_interval_secs",
            config.polling.admin_interval_secs,
        ),
        (
            "polling.session_interval_secs",
            config.polling.session_interval_secs,
        ),
        ("instance.retry_delay_ms", config.instance.retry_delay_ms),
        ("instance.probe_timeout_ms", config.instance.probe_timeout_ms),
        (
            "instance.max_retries",
            config.instance.max_retries.map(u64::from),
        ),
    ];

    for (field, value) in non_zero {
        if value == Some(0) {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("{field} must be greater than 0"),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&PlaygroundConfig::default()).is_ok());
    }

    #[test]
    fn test_relative_base_url_is_rejected() {
        let mut config = PlaygroundConfig::default();
        config.api.base_url = Some("playground.local".to_string());

        let err = validate_config(&config).unwrap_err();
        assert_eq!(
            crate::errors::PlaygroundError::error_code(&err),
            "INVALID_BASE_URL"
        );
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let mut config = PlaygroundConfig::default();
        config.polling.admin_interval_secs = Some(0);

        let err = validate_config(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: polling.admin_interval_secs must be greater than 0"
        );
    }
}
