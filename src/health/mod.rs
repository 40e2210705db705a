//! Health subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle readiness (readiness.rs):
//!     Listener bound → ready
//!     Drain begins   → not ready
//!
//! Dependency checks (dependency.rs):
//!     Periodic timer
//!     → TCP connect to each dependency
//!     → cached up/down per dependency
//!
//! Fault injection (faults.rs):
//!     Configured failure rate → lookup reported as failed
//! ```
//!
//! The readiness probe combines the lifecycle flag with the dependency cache;
//! lookups consult the dependency cache and the fault injector.

pub mod dependency;
pub mod faults;
pub mod readiness;

pub use dependency::{Dependency, DependencyMonitor, DependencyRegistry};
pub use faults::FaultInjector;
pub use readiness::ReadinessState;
