//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check addresses and path prefixes are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),

    #[error("rest.web_prefix `{0}` must be empty or start with '/', not end with '/' and contain no '{{', '}}' or '*'")]
    WebPrefix(String),

    #[error("auth.token_param must not be empty")]
    TokenParam,

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,

    #[error("security.max_body_size must be greater than zero")]
    MaxBodySize,
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let prefix = &config.rest.web_prefix;
    // Braces and `*` are route syntax and would not match literally.
    let route_syntax = prefix.contains(['{', '}', '*']);
    if route_syntax || (!prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/'))) {
        errors.push(ValidationError::WebPrefix(prefix.clone()));
    }

    if config.auth.token_param.trim().is_empty() {
        errors.push(ValidationError::TokenParam);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::MaxBodySize);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_web_prefix_rules() {
        let mut config = GatewayConfig::default();
        for ok in ["", "/shindig", "/a/b"] {
            config.rest.web_prefix = ok.to_string();
            assert!(validate_config(&config).is_ok(), "{ok} should be accepted");
        }

        for bad in ["shindig", "/shindig/", "/", "/gw{", "/{x}", "/gw/*rest", "/a}b"] {
            config.rest.web_prefix = bad.to_string();
            assert_eq!(
                validate_config(&config),
                Err(vec![ValidationError::WebPrefix(bad.to_string())])
            );
        }
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "not-an-address".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MetricsAddress("not-an-address".into())])
        );
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "localhost".into();
        config.auth.token_param = "  ".into();
        config.security.max_body_size = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("localhost".into()),
                ValidationError::TokenParam,
                ValidationError::MaxBodySize,
            ]
        );
    }
}
