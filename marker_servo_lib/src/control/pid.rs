use super::error_history::ErrorHistory;
use crate::PidGains;
use eyre::Result;

/// PID controller with a windowed integral.
///
/// The integral term only ever covers the last `ks` accepted samples: once
/// the error history evicts a sample, its value is taken back out of the
/// running sum. This bounds windup under a sustained bias.
#[derive(Debug, Clone)]
pub struct PIDController {
    gains: PidGains,

    // State
    history: ErrorHistory,
    integral_sum: f64,
    previous_error: f64,
    previous_timestamp: f64,
}

impl PIDController {
    /// Create a new PID controller, rejecting a zero-sized history window
    pub fn new(gains: PidGains) -> Result<Self> {
        let history = ErrorHistory::new(gains.ks)?;

        Ok(Self {
            gains,
            history,
            integral_sum: 0.0,
            previous_error: 0.0,
            previous_timestamp: 0.0,
        })
    }

    /// Feed one error sample taken at `timestamp` (seconds) and compute the
    /// control output.
    ///
    /// Returns `None` without touching any state when the timestamp does not
    /// advance past the last accepted one. Before the first accepted sample
    /// the previous timestamp is 0, so a first call at `t <= 0` is a no-op.
    ///
    /// The control law is `kp*e + ki*sum*dt + kd*(e - e_prev)/dt`, where
    /// `sum` is the raw sum of the windowed samples. The derivative term is
    /// unbounded as `dt` approaches zero and is deliberately not clamped;
    /// the gains are tuned against this exact law.
    pub fn control(&mut self, error: f64, timestamp: f64) -> Option<f64> {
        let dt = timestamp - self.previous_timestamp;
        if dt.is_nan() || dt <= 0.0 {
            return None;
        }

        self.integral_sum += error;
        if let Some(evicted) = self.history.push(error) {
            self.integral_sum -= evicted;
        }

        let derivative = error - self.previous_error;

        let p_term = self.gains.kp * error;
        let i_term = self.gains.ki * self.integral_sum * dt;
        let d_term = self.gains.kd * derivative / dt;

        self.previous_error = error;
        self.previous_timestamp = timestamp;

        Some(p_term + i_term + d_term)
    }

    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    pub fn integral_sum(&self) -> f64 {
        self.integral_sum
    }

    pub fn previous_error(&self) -> f64 {
        self.previous_error
    }

    pub fn previous_timestamp(&self) -> f64 {
        self.previous_timestamp
    }

    pub fn history(&self) -> &ErrorHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn pid(kp: f64, ki: f64, kd: f64, ks: usize) -> PIDController {
        PIDController::new(PidGains::new(kp, ki, kd, ks)).unwrap()
    }

    fn assert_unchanged(pid: &PIDController) {
        assert_eq!(pid.integral_sum(), 0.0);
        assert_eq!(pid.previous_error(), 0.0);
        assert_eq!(pid.previous_timestamp(), 0.0);
        assert!(pid.history().is_empty());
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(PIDController::new(PidGains::new(1.0, 0.0, 0.0, 0)).is_err());
    }

    #[test]
    fn test_unbounded_window_accepted() {
        let mut pid = pid(0.0, 1.0, 0.0, usize::MAX);

        assert_eq!(pid.control(1.0, 1.0), Some(1.0));
        assert_eq!(pid.control(1.0, 2.0), Some(2.0));
        assert_eq!(pid.history().size(), 2);
    }

    #[test]
    fn test_first_call_at_origin_is_noop() {
        let mut pid = pid(1.0, 1.0, 1.0, 5);

        assert_eq!(pid.control(3.0, 0.0), None);
        assert_unchanged(&pid);

        assert_eq!(pid.control(3.0, -1.5), None);
        assert_unchanged(&pid);
    }

    #[test]
    fn test_duplicate_and_out_of_order_samples_ignored() {
        let mut pid = pid(1.0, 1.0, 1.0, 5);
        assert!(pid.control(1.0, 2.0).is_some());

        let integral = pid.integral_sum();
        assert_eq!(pid.control(9.0, 2.0), None);
        assert_eq!(pid.control(9.0, 1.0), None);

        assert_eq!(pid.integral_sum(), integral);
        assert_eq!(pid.previous_error(), 1.0);
        assert_eq!(pid.previous_timestamp(), 2.0);
        assert_eq!(pid.history().size(), 1);
    }

    #[test]
    fn test_proportional_only_returns_error() {
        let mut pid = pid(1.0, 0.0, 0.0, 3);

        assert_eq!(pid.control(5.0, 0.1), Some(5.0));
        assert_eq!(pid.control(-3.0, 0.2), Some(-3.0));
        assert_eq!(pid.control(0.25, 7.0), Some(0.25));
        assert_eq!(pid.control(-8.0, 7.5), Some(-8.0));
    }

    #[test]
    fn test_tracking_gains_two_samples() {
        let mut pid = pid(0.06, 0.001, 0.05, 10);

        // dt=1, history=[2], sum=2, derivative=2
        let u1 = pid.control(2.0, 1.0).unwrap();
        assert!((u1 - 0.222).abs() < EPS, "u1 = {}", u1);
        assert_eq!(pid.integral_sum(), 2.0);

        // dt=1, history=[2, 2], sum=4, derivative=0
        let u2 = pid.control(2.0, 2.0).unwrap();
        assert!((u2 - 0.124).abs() < EPS, "u2 = {}", u2);
        assert_eq!(pid.integral_sum(), 4.0);
        assert_eq!(pid.history().size(), 2);
    }

    #[test]
    fn test_integral_scaled_by_current_dt() {
        let mut pid = pid(0.0, 1.0, 0.0, 10);

        assert_eq!(pid.control(1.0, 1.0), Some(1.0));
        // sum=2 scaled by dt=0.5, not an accumulated error*dt
        assert_eq!(pid.control(1.0, 1.5), Some(1.0));
        // sum=3 scaled by dt=2
        assert_eq!(pid.control(1.0, 3.5), Some(6.0));
    }

    #[test]
    fn test_derivative_zero_on_constant_error() {
        let mut pid = pid(0.0, 0.0, 1.0, 4);

        pid.control(0.7, 1.0);
        assert_eq!(pid.control(0.7, 1.3), Some(0.0));
        assert_eq!(pid.control(0.7, 9.0), Some(0.0));
    }

    #[test]
    fn test_derivative_divides_by_dt() {
        let mut pid = pid(0.0, 0.0, 2.0, 4);

        // First accepted sample differences against the initial previous error of 0
        let u = pid.control(1.0, 0.5).unwrap();
        assert!((u - 4.0).abs() < EPS);

        let u = pid.control(0.0, 0.75).unwrap();
        assert!((u + 8.0).abs() < EPS);
    }

    #[test]
    fn test_integral_matches_window() {
        let mut pid = pid(0.0, 0.0, 0.0, 3);
        let errors = [1.0, 2.0, 4.0, 8.0, 16.0, -3.0];

        for (i, e) in errors.iter().enumerate() {
            pid.control(*e, (i + 1) as f64);

            let start = (i + 1).saturating_sub(3);
            let expected: f64 = errors[start..=i].iter().sum();
            assert!((pid.integral_sum() - expected).abs() < EPS);
            assert!((pid.integral_sum() - pid.history().sum()).abs() < EPS);
            assert!(pid.history().size() <= 3);
        }

        assert_eq!(pid.history().iter().copied().collect::<Vec<_>>(), vec![8.0, 16.0, -3.0]);
    }

    #[test]
    fn test_windup_bounded_under_sustained_bias() {
        let mut pid = pid(0.0, 1.0, 0.0, 10);

        let mut last = 0.0;
        for i in 1..=1000 {
            last = pid.control(1.0, i as f64 * 0.01).unwrap();
        }

        // Ten samples of 1.0 scaled by dt=0.01
        assert!((pid.integral_sum() - 10.0).abs() < 1e-9);
        assert!((last - 0.1).abs() < 1e-9);
    }
}
