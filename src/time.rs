//! Monotonic time sources for slot timestamps and sweep deadlines

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic microsecond clock consumed by the tracker
///
/// Timestamps only ever feed subtraction against later readings from the
/// same clock, so the origin is arbitrary; only monotonicity matters.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Current reading in microseconds
    fn now_us(&self) -> u64;
}

/// Production clock backed by [`Instant`], anchored at construction
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock anchored at the current instant
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

/// Manually advanced clock for tests and hosts with an external timebase
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    /// Create a clock starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by the given number of microseconds
    pub fn advance_us(&self, micros: u64) {
        self.micros.fetch_add(micros, Ordering::SeqCst);
    }

    /// Advance the clock by the given number of milliseconds
    pub fn advance_ms(&self, millis: u64) {
        self.advance_us(millis * 1000);
    }

    /// Set the clock to an absolute reading
    pub fn set_us(&self, micros: u64) {
        self.micros.store(micros, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> u64 {
        self.micros.load(Ordering::SeqCst)
    }
}
