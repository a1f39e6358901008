//! Virtual clock for the discrete-event simulation.
//!
//! Time advances only when events are processed, in simulated seconds,
//! making runs deterministic regardless of host speed.

use serde::{Deserialize, Serialize};

/// Virtual simulation clock in f64 seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    current_s: f64,
}

impl SimClock {
    /// Create a new clock starting at time zero.
    pub fn new() -> Self {
        Self { current_s: 0.0 }
    }

    /// Current simulation time in seconds.
    pub fn now(&self) -> f64 {
        self.current_s
    }

    /// Advance the clock to an absolute time.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `t` is in the past.
    pub fn advance_to(&mut self, t: f64) {
        debug_assert!(
            t >= self.current_s,
            "Cannot move clock backwards: current={}s, target={}s",
            self.current_s,
            t,
        );
        self.current_s = t;
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}
