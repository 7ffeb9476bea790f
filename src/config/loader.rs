//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variables that override file values, applied in this order.
pub const ENV_BASE_URL: &str = "CUSTOMER_SERVICE_BASE_URL";
pub const ENV_CONNECTION_STRING: &str = "TELEMETRY_CONNECTION_STRING";
/// Name used by Application Insights deployments; read when
/// `TELEMETRY_CONNECTION_STRING` is unset.
pub const ENV_APPINSIGHTS_CONNECTION_STRING: &str = "APPLICATIONINSIGHTS_CONNECTION_STRING";
pub const ENV_BIND_ADDRESS: &str = "SERVICE_BIND_ADDRESS";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values given on the command line. They win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
}

/// Parse a TOML file without overrides or validation.
pub fn read_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load, override from the environment, and validate a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    finalize(read_config(path)?, &CliOverrides::default())
}

/// Apply environment then command-line overrides to `config` and validate
/// the result.
pub fn finalize(mut config: ServiceConfig, cli: &CliOverrides) -> Result<ServiceConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    if let Some(bind_address) = &cli.bind_address {
        config.listener.bind_address = bind_address.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay values from `lookup` (normally the process environment).
///
/// Blank values are ignored so an exported-but-empty variable does not
/// wipe a configured value.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(base_url) = var(ENV_BASE_URL) {
        config.customer_service.base_url = base_url;
    }
    if let Some(connection_string) =
        var(ENV_CONNECTION_STRING).or_else(|| var(ENV_APPINSIGHTS_CONNECTION_STRING))
    {
        config.observability.connection_string = Some(connection_string);
    }
    if let Some(bind_address) = var(ENV_BIND_ADDRESS) {
        config.listener.bind_address = bind_address;
    }
    if let Some(log_level) = var(ENV_LOG_LEVEL) {
        config.observability.log_level = log_level;
    }
}
