//! Simulation clock.
//!
//! The clock counts discrete steps and the simulated seconds they covered.
//! It is advanced exactly once per [`Simulation::step`] and is the source of
//! truth for "how long has this world been running".
//!
//! [`Simulation::step`]: crate::simulation::Simulation::step

use serde::{Deserialize, Serialize};

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Step counter would overflow.
    #[error("step counter overflow: cannot advance beyond u64::MAX")]
    StepOverflow,
}

/// Step counter plus elapsed simulated time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    step: u64,
    elapsed_seconds: f64,
}

impl SimClock {
    /// A clock at step 0.
    pub const fn new() -> Self {
        Self {
            step: 0,
            elapsed_seconds: 0.0,
        }
    }

    /// Sanitize a frame delta: negative, NaN, and infinite values become 0.
    pub fn sanitize_dt(dt: f32) -> f32 {
        if dt.is_finite() && dt > 0.0 { dt } else { 0.0 }
    }

    /// Advance by one step covering `dt` seconds (already sanitized).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::StepOverflow`] if the step counter is
    /// exhausted; the clock is unchanged in that case.
    pub fn advance(&mut self, dt: f32) -> Result<u64, ClockError> {
        let next = self.step.checked_add(1).ok_or(ClockError::StepOverflow)?;
        self.step = next;
        self.elapsed_seconds += f64::from(dt);
        Ok(next)
    }

    /// Number of completed steps.
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Total simulated seconds.
    pub const fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }
}
