//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and addresses.
//! All problems are reported at once, not just the first.

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::ServiceConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("faults.failure_rate must be within [0, 1], got {0}")]
    FailureRateOutOfRange(f64),

    #[error("dependency #{index} has an empty {field}")]
    EmptyDependencyField { index: usize, field: &'static str },

    #[error("dependency '{0}' is declared more than once")]
    DuplicateDependency(String),
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroDuration { field: "timeouts.request_secs" });
    }
    if config.timeouts.shutdown_grace_secs == 0 {
        errors.push(ValidationError::ZeroDuration { field: "timeouts.shutdown_grace_secs" });
    }
    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::ZeroDuration { field: "health_check.interval_secs" });
    }
    if config.health_check.timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration { field: "health_check.timeout_ms" });
    }

    let rate = config.faults.failure_rate;
    if !(0.0..=1.0).contains(&rate) {
        errors.push(ValidationError::FailureRateOutOfRange(rate));
    }

    let mut seen = HashSet::new();
    for (index, dep) in config.dependencies.iter().enumerate() {
        if dep.name.trim().is_empty() {
            errors.push(ValidationError::EmptyDependencyField { index, field: "name" });
        } else if !seen.insert(dep.name.as_str()) {
            errors.push(ValidationError::DuplicateDependency(dep.name.clone()));
        }
        if dep.address.trim().is_empty() {
            errors.push(ValidationError::EmptyDependencyField { index, field: "address" });
        }
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
    use crate::config::schema::DependencyConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.shutdown_grace_secs = 0;
        config.faults.failure_rate = 1.5;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::FailureRateOutOfRange(1.5)));
        assert!(errors.contains(&ValidationError::ZeroDuration {
            field: "timeouts.shutdown_grace_secs"
        }));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_duplicate_and_empty_dependencies() {
        let mut config = ServiceConfig::default();
        config.dependencies = vec![
            DependencyConfig { name: "db".into(), address: "127.0.0.1:5432".into() },
            DependencyConfig { name: "db".into(), address: "127.0.0.1:5433".into() },
            DependencyConfig { name: " ".into(), address: "".into() },
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicateDependency("db".into()),
                ValidationError::EmptyDependencyField { index: 2, field: "name" },
                ValidationError::EmptyDependencyField { index: 2, field: "address" },
            ]
        );
    }
}
