//! Time source for the simulation
//!
//! The clock is the only place the simulation reads time from. Timestamps are
//! monotonic milliseconds since the clock was created.

use std::time::Instant;

/// Monotonic millisecond time source
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock for deterministic runs and tests
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self { now: start_ms }
    }

    /// Move time forward (never backward)
    pub fn advance(&mut self, ms: u64) {
        self.now = self.now.saturating_add(ms);
    }

    /// Jump to an absolute time; earlier times are ignored to stay monotonic
    pub fn set(&mut self, ms: u64) {
        self.now = self.now.max(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now
    }
}
