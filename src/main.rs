//! Lookup service.
//!
//! Meant to run in a container under an orchestrator that polls `/live` and
//! `/ready`:
//!
//! ```text
//!  readiness fails  → orchestrator stops routing traffic to the pod
//!  liveness fails   → orchestrator restarts the container
//!  readiness passes → traffic is routed to the pod again
//! ```
//!
//! # Startup
//! `.env` → config file (optional) → `LOOKUP_*` env → `--bind` flag →
//! validation → logging → metrics → dependency monitor → listener.
//!
//! # Shutdown
//! SIGTERM/SIGINT → readiness off → stop accepting → drain (bounded) → exit.

use std::path::PathBuf;

use clap::Parser;

use lookup_service::config::{
    apply_env_overrides, load_config, validate_config, ConfigError, ServiceConfig,
};
use lookup_service::health::{DependencyMonitor, DependencyRegistry, ReadinessState};
use lookup_service::http::{build_router, AppState};
use lookup_service::lifecycle::{LifecycleCoordinator, Shutdown};
use lookup_service::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "lookup-service")]
#[command(about = "Resource lookup service with liveness and readiness probes", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address (e.g. 0.0.0.0:50001).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    let ignored_overrides = apply_env_overrides(&mut config);
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "lookup-service starting");
    for ignored in &ignored_overrides {
        tracing::warn!(var = ignored.var, value = %ignored.value, "Ignoring unparseable override");
    }
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        shutdown_grace_secs = config.timeouts.shutdown_grace_secs,
        dependencies = config.dependencies.len(),
        failure_rate = config.faults.failure_rate,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let readiness = ReadinessState::new();
    let dependencies = DependencyRegistry::from_config(&config.dependencies);

    let monitor = DependencyMonitor::new(dependencies.clone(), &config.health_check);
    let monitor_shutdown = shutdown.subscribe();
    let monitor_task = tokio::spawn(monitor.run(monitor_shutdown));

    let state = AppState::new(&config, readiness.clone(), dependencies);
    let router = build_router(&config, state);

    let service = match LifecycleCoordinator::new(&config, router, readiness)
        .with_shutdown(shutdown)
        .start()
        .await
    {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    let outcome = service.run_until_signal().await?;
    monitor_task.abort();

    tracing::info!(?outcome, "Shutdown complete");
    Ok(())
}
