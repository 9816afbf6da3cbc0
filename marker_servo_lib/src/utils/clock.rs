use crate::Clock;
use std::time::Instant;

/// Monotonic seconds since construction.
///
/// Used as the single time base for the warm-up gate and the PID
/// timestamps, so the first accepted sample sees a `dt` measured from the
/// node start rather than from the Unix epoch.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
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
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}
