//! Runtime configuration (`[runtime]` table of mosaic.toml)

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings shared by the class builder and the runtime registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Reject a definition whose name is already registered
    pub unique_names: bool,

    /// Maximum nesting of wrapped calls on one instance
    pub max_call_depth: usize,

    /// Interface members starting with this prefix are not copied
    pub private_prefix: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            unique_names: true,
            max_call_depth: 256,
            private_prefix: "_".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_call_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_call_depth must be greater than zero".to_string(),
            ));
        }
        if self.private_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "private_prefix cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
