//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ServiceConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `customer_service.base_url`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let customers = &config.customer_service;
    match Url::parse(&customers.base_url) {
        Ok(url) if !matches!(url.scheme(), "http" | "https") => errors.push(ValidationError::new(
            "customer_service.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Ok(url) if url.cannot_be_a_base() => errors.push(ValidationError::new(
            "customer_service.base_url",
            "must be usable as a base URL",
        )),
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new(
            "customer_service.base_url",
            format!("'{}': {e}", customers.base_url),
        )),
    }

    if customers.timeout_ms == 0 {
        errors.push(ValidationError::new("customer_service.timeout_ms", "must be greater than 0"));
    } else if customers.timeout_ms >= config.timeouts.request_secs.saturating_mul(1000) {
        errors.push(ValidationError::new(
            "customer_service.timeout_ms",
            format!(
                "must be below the request timeout ({}s)",
                config.timeouts.request_secs
            ),
        ));
    }
    if customers.connect_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "customer_service.connect_timeout_ms",
            "must be greater than 0",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let observability = &config.observability;
    if observability.service_name.trim().is_empty() {
        errors.push(ValidationError::new("observability.service_name", "must not be blank"));
    }
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", observability.log_level),
        ));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }
    if let Some(connection_string) = &observability.connection_string {
        if connection_string.trim().is_empty() {
            errors.push(ValidationError::new(
                "observability.connection_string",
                "must not be blank when set",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
