//! # Configuration System
//!
//! Hierarchical TOML configuration for the playground console.
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.playground/config.toml`
//! 3. **Project config** - `./.playground/config.toml`
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ```rust,no_run
//! use playground_core::config::PlaygroundConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PlaygroundConfig::load_hierarchy()?;
//!     println!("polling every {:?}", config.admin_interval());
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{ApiConfig, InstanceConfig, PlaygroundConfig, PollingConfig};
pub use validation::validate_config;

impl PlaygroundConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }
}
