//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (coordinator.rs):
//!     Bind listener → Spawn serve task → Mark ready
//!
//! Shutdown (coordinator.rs, shutdown.rs):
//!     Signal received → Mark not ready → Stop accepting → Drain → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then background tasks, then listener
//! - Ordered shutdown: stop accept, drain, close
//! - Shutdown has timeout: forced exit after deadline

pub mod coordinator;
pub mod shutdown;
pub mod signals;

pub use coordinator::{
    LifecycleCoordinator, LifecycleError, LifecycleState, RunningService, ShutdownOutcome,
    Termination,
};
pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
