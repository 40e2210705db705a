//! Lifecycle readiness flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::observability::metrics;

/// Shared state for readiness tracking.
///
/// The lifecycle coordinator sets this once the listener is bound and clears
/// it as soon as draining begins, so the orchestrator stops routing traffic
/// before connections are refused.
#[derive(Debug, Clone, Default)]
pub struct ReadinessState {
    ready: Arc<AtomicBool>,
}

impl ReadinessState {
    /// Create a new readiness state (initially not ready).
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service as ready.
    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        metrics::record_ready(true);
    }

    /// Mark the service as not ready (e.g., during shutdown).
    pub fn set_not_ready(&self) {
        self.ready.store(false, Ordering::SeqCst);
        metrics::record_ready(false);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}
