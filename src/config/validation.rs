//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (body limit > 0, address parses)
//! - Check the upstream base URL can be extended with path segments
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),
    #[error("upstream.base_url `{0}` is not a valid URL")]
    BaseUrl(String),
    #[error("upstream.base_url `{0}` must use http or https")]
    BaseUrlScheme(String),
    #[error("upstream.base_url `{0}` cannot carry path segments")]
    BaseUrlNotABase(String),
    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
    #[error("secret.env_var must not be empty")]
    EmptySecretVar,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let base_url = &config.upstream.base_url;
    match Url::parse(base_url) {
        Ok(url) => {
            if !matches!(url.scheme(), "http" | "https") {
                errors.push(ValidationError::BaseUrlScheme(base_url.clone()));
            } else if url.cannot_be_a_base() {
                errors.push(ValidationError::BaseUrlNotABase(base_url.clone()));
            }
        }
        Err(_) => errors.push(ValidationError::BaseUrl(base_url.clone())),
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.secret.env_var.trim().is_empty() {
        errors.push(ValidationError::EmptySecretVar);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
