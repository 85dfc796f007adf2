//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - see [`super::defaults`]
//! 2. **User config** - `~/.playground/config.toml`
//! 3. **Project config** - `./.playground/config.toml`
//! 4. **CLI arguments** - Command-line flags (highest priority, applied by the CLI)

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::types::{ApiConfig, InstanceConfig, PlaygroundConfig, PollingConfig};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

const CONFIG_DIR: &str = ".playground";
const CONFIG_FILE: &str = "config.toml";

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a present file cannot be parsed or if validation fails.
/// Missing config files are not errors.
pub fn load_hierarchy() -> Result<PlaygroundConfig, ConfigError> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(CONFIG_DIR).join(CONFIG_FILE));
    }
    paths.push(std::env::current_dir()?.join(CONFIG_DIR).join(CONFIG_FILE));

    load_from_paths(&paths)
}

/// Load and merge the given config files in order, skipping missing ones.
pub fn load_from_paths(paths: &[PathBuf]) -> Result<PlaygroundConfig, ConfigError> {
    let mut config = PlaygroundConfig::default();

    for path in paths {
        match load_config_file(path) {
            Ok(layer) => config = merge_configs(config, layer),
            Err(ConfigError::ConfigNotFound { path }) => {
                debug!(event = "core.config.file_skipped", path = path);
            }
            Err(e) => return Err(e),
        }
    }

    validate_config(&config)?;
    Ok(config)
}

/// Load a single configuration file.
pub fn load_config_file(path: &Path) -> Result<PlaygroundConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Merge two configurations, with `override_config` taking precedence.
///
/// Every field is optional, so a value present in the override replaces the
/// base value and an absent one keeps it.
pub fn merge_configs(base: PlaygroundConfig, override_config: PlaygroundConfig) -> PlaygroundConfig {
    PlaygroundConfig {
        api: ApiConfig {
            base_url: override_config.api.base_url.or(base.api.base_url),
            request_timeout_ms: override_config
                .api
                .request_timeout_ms
                .or(base.api.request_timeout_ms),
        },
        polling: PollingConfig {
            admin_interval_secs: override_config
                .polling
                .admin_interval_secs
                .or(base.polling.admin_interval_secs),
            session_interval_secs: override_config
                .polling
                .session_interval_secs
                .or(base.polling.session_interval_secs),
        },
        instance: InstanceConfig {
            max_retries: override_config
                .instance
                .max_retries
                .or(base.instance.max_retries),
            retry_delay_ms: override_config
                .instance
                .retry_delay_ms
                .or(base.instance.retry_delay_ms),
            probe_timeout_ms: override_config
                .instance
                .probe_timeout_ms
                .or(base.instance.probe_timeout_ms),
        },
    }
}
