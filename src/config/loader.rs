//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_BIND_ADDRESS: &str = "RELAY_BIND_ADDRESS";
pub const ENV_PUBLIC_PREFIX: &str = "RELAY_PUBLIC_PREFIX";
pub const ENV_BACKEND_ORIGIN: &str = "RELAY_BACKEND_ORIGIN";
pub const ENV_BACKEND_PREFIX: &str = "RELAY_BACKEND_PREFIX";
pub const ENV_CONNECT_TIMEOUT: &str = "RELAY_CONNECT_TIMEOUT_SECS";
pub const ENV_RESPONSE_TIMEOUT: &str = "RELAY_RESPONSE_TIMEOUT_SECS";
pub const ENV_READ_TIMEOUT: &str = "RELAY_READ_TIMEOUT_SECS";
pub const ENV_ASSETS_DIR: &str = "RELAY_ASSETS_DIR";
pub const ENV_LOG_LEVEL: &str = "RELAY_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { key: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { key, value } => write!(f, "Invalid value for {}: {:?}", key, value),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from an optional TOML file, apply `RELAY_*` environment
/// overrides and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit variable lookup.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => RelayConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment-provided values on top of the file configuration.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = v;
    }
    if let Some(v) = lookup(ENV_PUBLIC_PREFIX) {
        config.proxy.public_prefix = v;
    }
    if let Some(v) = lookup(ENV_BACKEND_ORIGIN) {
        config.proxy.backend_origin = v;
    }
    if let Some(v) = lookup(ENV_BACKEND_PREFIX) {
        config.proxy.backend_prefix = v;
    }
    if let Some(v) = lookup(ENV_CONNECT_TIMEOUT) {
        config.timeouts.connect_secs = parse_secs(ENV_CONNECT_TIMEOUT, v)?;
    }
    if let Some(v) = lookup(ENV_RESPONSE_TIMEOUT) {
        config.timeouts.response_secs = parse_secs(ENV_RESPONSE_TIMEOUT, v)?;
    }
    if let Some(v) = lookup(ENV_READ_TIMEOUT) {
        config.timeouts.read_secs = parse_secs(ENV_READ_TIMEOUT, v)?;
    }
    if let Some(v) = lookup(ENV_ASSETS_DIR) {
        config.assets.root = Some(v);
    }
    if let Some(v) = lookup(ENV_LOG_LEVEL) {
        config.observability.log_level = v;
    }
    Ok(())
}

fn parse_secs(key: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { key, value })
}
