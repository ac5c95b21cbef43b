//! Monotonic time adapter.
//!
//! Implements [`Clock`] on top of `std::time::Instant`. Every time-based
//! component (classifier hold, scheduler, touch debounce) reads
//! milliseconds from this adapter so tests can substitute a manual clock.

use std::time::Instant;

use crate::app::ports::Clock;

/// Milliseconds since the adapter was created.
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
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
