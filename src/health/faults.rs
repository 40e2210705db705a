//! Fault injection for the lookup path.

use rand::Rng;

/// Reports a lookup as failed with a fixed probability.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultInjector {
    failure_rate: f64,
}

impl FaultInjector {
    /// Rates outside [0, 1] are clamped.
    pub fn new(failure_rate: f64) -> Self {
        Self {
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    pub fn should_fail(&self) -> bool {
        if self.failure_rate <= 0.0 {
            return false;
        }
        if self.failure_rate >= 1.0 {
            return true;
        }
        rand::thread_rng().gen_bool(self.failure_rate)
    }
}
