//! Stopping rule for the power iteration.

/// Default L1 threshold.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Outcome of checking one iteration's change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Stop,
}

/// Absolute L1 threshold test.
///
/// The threshold is not scaled by `n` or the damping factor, so very large
/// graphs may need a tighter value to reach the same per-node accuracy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergencePolicy {
    tolerance: f64,
}

impl Default for ConvergencePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl ConvergencePolicy {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Stop once the change is strictly below the threshold. NaN never stops.
    pub fn decide(&self, delta: f64) -> Decision {
        if delta < self.tolerance {
            Decision::Stop
        } else {
            Decision::Continue
        }
    }
}
