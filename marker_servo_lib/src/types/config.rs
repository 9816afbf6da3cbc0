use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::str::FromStr;
use tracing::warn;

/// Gains and integral window for one controlled axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,   // Proportional gain
    pub ki: f64,   // Integral gain
    pub kd: f64,   // Derivative gain
    pub ks: usize, // Error history window (samples)
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64, ks: usize) -> Self {
        Self { kp, ki, kd, ks }
    }

    fn validate(&self, axis: &str) -> Result<()> {
        if self.ks == 0 {
            return Err(eyre!("{} PID window (ks) must be at least 1", axis));
        }
        if !(self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()) {
            return Err(eyre!(
                "{} PID gains must be finite (kp={}, ki={}, kd={})",
                axis,
                self.kp,
                self.ki,
                self.kd
            ));
        }
        Ok(())
    }
}

/// Marker servo configuration, fixed for the lifetime of the node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoConfig {
    /// Frame the marker position is expressed in
    pub reference_frame: String,
    /// Frame of the tracked marker
    pub target_frame: String,

    /// Settling time before control starts (seconds)
    pub warmup_delay: f64,
    /// Control cycle period (seconds)
    pub period: f64,
    /// Transforms older than this are treated as a lost marker (seconds)
    pub transform_max_age: Option<f64>,

    /// Forward speed from depth separation
    pub longitudinal: PidGains,
    /// Yaw rate from sideways offset
    pub lateral: PidGains,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            reference_frame: "camera".to_string(),
            target_frame: "tag36h11_0".to_string(),
            warmup_delay: 4.0,
            period: 0.001,
            transform_max_age: None,
            longitudinal: PidGains::new(0.06, 0.001, 0.05, 10),
            lateral: PidGains::new(2.5, 0.01, 0.2, 10),
        }
    }
}

impl ServoConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| eyre!("Failed to read servo config {}: {}", path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ServoConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Resolve the node configuration: TOML file from `SERVO_CONFIG` if set,
    /// defaults otherwise, then environment overrides, then validation.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("SERVO_CONFIG") {
            Ok(path) => Self::load_from_file(&path)?,
            Err(_) => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override individual fields from environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        override_value(&lookup, "LONGITUDINAL_PID_KP", &mut self.longitudinal.kp);
        override_value(&lookup, "LONGITUDINAL_PID_KI", &mut self.longitudinal.ki);
        override_value(&lookup, "LONGITUDINAL_PID_KD", &mut self.longitudinal.kd);
        override_value(&lookup, "LONGITUDINAL_PID_KS", &mut self.longitudinal.ks);

        override_value(&lookup, "LATERAL_PID_KP", &mut self.lateral.kp);
        override_value(&lookup, "LATERAL_PID_KI", &mut self.lateral.ki);
        override_value(&lookup, "LATERAL_PID_KD", &mut self.lateral.kd);
        override_value(&lookup, "LATERAL_PID_KS", &mut self.lateral.ks);

        override_value(&lookup, "WARMUP_DELAY", &mut self.warmup_delay);
        override_value(&lookup, "CONTROL_PERIOD", &mut self.period);

        if let Some(val) = lookup("REFERENCE_FRAME") {
            self.reference_frame = val;
        }
        if let Some(val) = lookup("TARGET_FRAME") {
            self.target_frame = val;
        }
        if let Some(val) = lookup("TRANSFORM_MAX_AGE") {
            match val.parse() {
                Ok(age) => self.transform_max_age = Some(age),
                Err(_) => warn!("Ignoring unparsable TRANSFORM_MAX_AGE={:?}", val),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.longitudinal.validate("Longitudinal")?;
        self.lateral.validate("Lateral")?;

        if !(self.warmup_delay.is_finite() && self.warmup_delay >= 0.0) {
            return Err(eyre!("Warm-up delay must be >= 0 (got {})", self.warmup_delay));
        }
        if !(self.period.is_finite() && self.period > 0.0) {
            return Err(eyre!("Control period must be > 0 (got {})", self.period));
        }
        if let Some(age) = self.transform_max_age {
            if age.is_nan() || age <= 0.0 {
                return Err(eyre!("Transform max age must be > 0 (got {})", age));
            }
        }
        if self.reference_frame.is_empty() || self.target_frame.is_empty() {
            return Err(eyre!("Reference and target frame names must not be empty"));
        }

        Ok(())
    }
}

fn override_value<T, F>(lookup: &F, key: &str, slot: &mut T)
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(key) {
        match val.parse() {
            Ok(parsed) => *slot = parsed,
            Err(_) => warn!("Ignoring unparsable {}={:?}", key, val),
        }
    }
}
