//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check prefix shapes so the resolver never builds a malformed URL
//! - Check the backend origin is a bare scheme + host
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must start with '/' and must not end with '/' (got {value:?})")]
    InvalidPrefix { field: &'static str, value: String },

    #[error("backend_origin {value:?} is not a valid origin: {reason}")]
    InvalidOrigin { value: String, reason: String },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("{field} {value:?} is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a loaded configuration, collecting every error.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !is_valid_prefix(&config.proxy.public_prefix) {
        errors.push(ValidationError::InvalidPrefix {
            field: "public_prefix",
            value: config.proxy.public_prefix.clone(),
        });
    }

    // An empty backend prefix maps the API surface onto the backend root.
    if !config.proxy.backend_prefix.is_empty() && !is_valid_prefix(&config.proxy.backend_prefix) {
        errors.push(ValidationError::InvalidPrefix {
            field: "backend_prefix",
            value: config.proxy.backend_prefix.clone(),
        });
    }

    if let Err(reason) = check_origin(&config.proxy.backend_origin) {
        errors.push(ValidationError::InvalidOrigin {
            value: config.proxy.backend_origin.clone(),
            reason,
        });
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "connect_secs" });
    }
    if config.timeouts.response_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "response_secs" });
    }
    if config.timeouts.read_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "read_secs" });
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_valid_prefix(prefix: &str) -> bool {
    prefix.len() > 1 && prefix.starts_with('/') && !prefix.ends_with('/')
}

fn check_origin(origin: &str) -> Result<(), String> {
    let url = Url::parse(origin).map_err(|e| e.to_string())?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("unsupported scheme {:?}", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err("origin must not carry a path, query or fragment".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RelayConfig::default();
        config.proxy.public_prefix = "api/".into();
        config.proxy.backend_origin = "ftp://files.example.com".into();
        config.timeouts.response_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ValidationError::InvalidPrefix { field: "public_prefix", .. }));
        assert!(matches!(errors[1], ValidationError::InvalidOrigin { .. }));
        assert_eq!(errors[2], ValidationError::ZeroTimeout { field: "response_secs" });
    }

    #[test]
    fn test_empty_backend_prefix_allowed() {
        let mut config = RelayConfig::default();
        config.proxy.backend_prefix = String::new();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_origin_with_path_rejected() {
        let mut config = RelayConfig::default();
        config.proxy.backend_origin = "https://backend.example.com/api_backend_ai".into();
        assert!(validate_config(&config).is_err());

        // A lone trailing slash is still a bare origin.
        config.proxy.backend_origin = "https://backend.example.com/".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_root_prefix_rejected() {
        let mut config = RelayConfig::default();
        config.proxy.public_prefix = "/".into();
        assert!(validate_config(&config).is_err());
    }
}
