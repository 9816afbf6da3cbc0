/// Fraction of a period a tick may arrive early and still run its cycle
const EARLY_SLACK: f64 = 0.5;

/// Paces control cycles against a schedule of due times.
///
/// A tick runs when it arrives no more than half a period before the next
/// due time, so timer jitter around the nominal period never drops a cycle.
/// Each cycle that runs advances the schedule by exactly one period. After
/// a stall longer than a period the schedule restarts from the late tick
/// instead of bursting to catch up.
#[derive(Debug, Clone)]
pub struct CadenceLimiter {
    period: f64,
    next_due: Option<f64>,
}

impl CadenceLimiter {
    pub fn new(period: f64) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Decide whether the tick arriving at `now` should run a cycle
    pub fn ready(&mut self, now: f64) -> bool {
        let due = match self.next_due {
            Some(due) => due,
            None => {
                self.next_due = Some(now + self.period);
                return true;
            }
        };

        if now < due - self.period * EARLY_SLACK {
            return false;
        }

        let next = due + self.period;
        self.next_due = Some(if next <= now { now + self.period } else { next });
        true
    }

    pub fn period(&self) -> f64 {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: f64 = 0.001;

    #[test]
    fn test_first_tick_runs() {
        let mut cadence = CadenceLimiter::new(PERIOD);

        assert!(cadence.ready(12.0));
    }

    #[test]
    fn test_slightly_early_tick_runs() {
        let mut cadence = CadenceLimiter::new(PERIOD);

        assert!(cadence.ready(0.0));
        assert!(cadence.ready(0.0009998));
        assert!(cadence.ready(0.0020001));
        assert!(cadence.ready(0.0029995));
    }

    #[test]
    fn test_late_tick_keeps_schedule() {
        let mut cadence = CadenceLimiter::new(PERIOD);

        assert!(cadence.ready(0.0));
        assert!(cadence.ready(0.0012));
        // Next due stays at 2 ms rather than drifting to 2.2 ms
        assert!(cadence.ready(0.0016));
        assert!(!cadence.ready(0.0022));
        assert!(cadence.ready(0.0030));
    }

    #[test]
    fn test_fast_timer_is_throttled() {
        let mut cadence = CadenceLimiter::new(PERIOD);
        let mut cycles = 0;

        // 0.3 ms ticks for 100 ms
        for i in 0..334 {
            if cadence.ready(i as f64 * 0.0003) {
                cycles += 1;
            }
        }

        assert!((99..=101).contains(&cycles), "cycles = {}", cycles);
    }

    #[test]
    fn test_stall_resynchronizes_without_burst() {
        let mut cadence = CadenceLimiter::new(PERIOD);

        assert!(cadence.ready(0.0));
        assert!(cadence.ready(0.010));
        // Schedule restarts at 11 ms instead of replaying 2..10 ms
        assert!(!cadence.ready(0.0102));
        assert!(cadence.ready(0.011));
    }
}
