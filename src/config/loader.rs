//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "LOOKUP_BIND_ADDRESS";
/// Environment variable overriding `timeouts.shutdown_grace_secs`.
pub const ENV_SHUTDOWN_GRACE_SECS: &str = "LOOKUP_SHUTDOWN_GRACE_SECS";
/// Environment variable overriding `observability.log_level`.
pub const ENV_LOG_LEVEL: &str = "LOOKUP_LOG_LEVEL";
/// Environment variable overriding `observability.log_format`.
pub const ENV_LOG_FORMAT: &str = "LOOKUP_LOG_FORMAT";
/// Environment variable overriding `faults.failure_rate`.
pub const ENV_FAILURE_RATE: &str = "LOOKUP_FAILURE_RATE";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServiceConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// An override whose value could not be parsed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredOverride {
    pub var: &'static str,
    pub value: String,
}

/// Apply `LOOKUP_*` overrides from the process environment.
///
/// Runs before logging is initialised, so rejected values are returned for
/// the caller to report.
pub fn apply_env_overrides(config: &mut ServiceConfig) -> Vec<IgnoredOverride> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides from an arbitrary lookup.
pub fn apply_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Vec<IgnoredOverride>
where
    F: Fn(&str) -> Option<String>,
{
    let mut ignored = Vec::new();
    let mut reject = |var, value: String| ignored.push(IgnoredOverride { var, value });

    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }

    if let Some(raw) = lookup(ENV_SHUTDOWN_GRACE_SECS) {
        match raw.parse() {
            Ok(secs) => config.timeouts.shutdown_grace_secs = secs,
            Err(_) => reject(ENV_SHUTDOWN_GRACE_SECS, raw),
        }
    }

    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        config.observability.log_level = level;
    }

    if let Some(raw) = lookup(ENV_LOG_FORMAT) {
        match raw.parse() {
            Ok(format) => config.observability.log_format = format,
            Err(_) => reject(ENV_LOG_FORMAT, raw),
        }
    }

    if let Some(raw) = lookup(ENV_FAILURE_RATE) {
        match raw.parse() {
            Ok(rate) => config.faults.failure_rate = rate,
            Err(_) => reject(ENV_FAILURE_RATE, raw),
        }
    }

    ignored
}
