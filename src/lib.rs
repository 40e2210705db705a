//! Resource lookup service with orchestrator probes and graceful shutdown.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use http::{build_router, AppState};
pub use lifecycle::{LifecycleCoordinator, RunningService, Shutdown, ShutdownOutcome};
