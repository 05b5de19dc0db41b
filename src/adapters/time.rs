//! Host time adapter.
//!
//! Provides monotonic time for transfer timing and reassembly timeouts,
//! backed by `std::time::Instant`.

use std::time::Instant;

use crate::app::ports::TimePort;

/// Monotonic clock anchored at construction.
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds since construction.
    pub fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }

    /// Microseconds since construction (saturates at `u64::MAX`).
    pub fn uptime_us(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

impl TimePort for MonotonicClock {
    fn now_us(&self) -> u64 {
        self.uptime_us()
    }
}
