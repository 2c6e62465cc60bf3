//! Configuration loading and validation.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::{LlmConfig, MaitredConfig};

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
    #[error("environment variable '{0}' not found")]
    EnvNotFound(String),
}

/// Load the full configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<MaitredConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: MaitredConfig = serde_yaml::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Resolve the API key from the environment variable the config names.
pub fn resolve_api_key(llm: &LlmConfig) -> Result<String, ConfigError> {
    std::env::var(&llm.api_key_env).map_err(|_| ConfigError::EnvNotFound(llm.api_key_env.clone()))
}

pub(crate) fn validate_config(config: &MaitredConfig) -> Result<(), ConfigError> {
    if config.app.name.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "app.name must not be empty".to_string(),
        ));
    }

    if config.llm.model.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "llm.model must not be empty".to_string(),
        ));
    }

    if config.llm.timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "llm.timeout_secs must be > 0".to_string(),
        ));
    }

    if config.guest.name.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "guest.name must not be empty".to_string(),
        ));
    }

    if config.guest.restaurant_name.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "guest.restaurant_name must not be empty".to_string(),
        ));
    }

    // Range-checked again at conversion, but failing at load gives a
    // better message.
    config.guest.to_goal_facts().map(|_| ())
}
