//! Structured logging.
//!
//! `RUST_LOG` takes precedence over the configured level. JSON output is meant
//! for log aggregation in the cluster, compact output for local runs.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, ObservabilityConfig};

/// Build the filter: `RUST_LOG` if set, otherwise the configured level.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},lookup_service={level},tower_http={level}",
            level = config.log_level
        ))
    })
}

/// Install the global subscriber and route panics through `tracing`.
///
/// Calling this twice is harmless; the second installation is skipped.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = env_filter(config);

    let result = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .try_init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init(),
    };

    if result.is_err() {
        return;
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}
