//! Dual-axis marker servo loop.
//!
//! Each `tick()` runs one control cycle to completion: check the warm-up
//! gate, look up the marker transform, advance the longitudinal and lateral
//! PID controllers with a shared timestamp and hand the resulting velocity
//! pair to the actuation sink. Whatever drives `tick()` (a dora timer, a
//! test harness, a simulated clock) must not call it re-entrantly.

use super::gate::WarmupGate;
use super::pid::PIDController;
use crate::{
    ServoConfig, ServoTelemetry, TrackingErrors, TrackingState, TransformLookup, VelocityCommand,
};
use eyre::Result;
use tracing::debug;

/// Time source in seconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Resolves the tracked marker relative to the reference frame
pub trait PoseProvider {
    fn lookup(&self, reference: &str, target: &str, at_time: f64) -> TransformLookup;
}

/// Receives velocity commands. Delivery is fire-and-forget; an `Err` only
/// reports a transport failure.
pub trait ActuationSink {
    fn publish(&mut self, command: &VelocityCommand) -> Result<()>;
}

/// Collaborators handed to the loop for one cycle
pub struct ServoContext<'a> {
    pub clock: &'a dyn Clock,
    pub poses: &'a dyn PoseProvider,
    pub sink: &'a mut dyn ActuationSink,
}

/// What a single cycle did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Warm-up window still running
    Initializing { remaining: f64 },
    /// Marker transform unavailable, nothing computed or published
    TargetNotFound,
    /// Marker seen but an axis returned no output (non-advancing timestamp)
    Suppressed { errors: TrackingErrors },
    /// Command computed and published
    Commanded {
        errors: TrackingErrors,
        command: VelocityCommand,
    },
}

impl CycleOutcome {
    pub fn state(&self) -> TrackingState {
        match self {
            CycleOutcome::Initializing { .. } => TrackingState::Initializing,
            CycleOutcome::TargetNotFound => TrackingState::Searching,
            CycleOutcome::Suppressed { .. } => TrackingState::Holding,
            CycleOutcome::Commanded { .. } => TrackingState::Tracking,
        }
    }

    pub fn errors(&self) -> Option<TrackingErrors> {
        match self {
            CycleOutcome::Suppressed { errors } | CycleOutcome::Commanded { errors, .. } => {
                Some(*errors)
            }
            _ => None,
        }
    }

    pub fn command(&self) -> Option<VelocityCommand> {
        match self {
            CycleOutcome::Commanded { command, .. } => Some(*command),
            _ => None,
        }
    }

    pub fn to_telemetry(&self) -> ServoTelemetry {
        ServoTelemetry {
            state: self.state(),
            errors: self.errors(),
            command: self.command(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

pub struct DualAxisControlLoop {
    gate: WarmupGate,
    reference_frame: String,
    target_frame: String,
    longitudinal: PIDController,
    lateral: PIDController,
}

impl DualAxisControlLoop {
    pub fn new(config: &ServoConfig, start_time: f64) -> Result<Self> {
        Ok(Self {
            gate: WarmupGate::new(start_time, config.warmup_delay),
            reference_frame: config.reference_frame.clone(),
            target_frame: config.target_frame.clone(),
            longitudinal: PIDController::new(config.longitudinal)?,
            lateral: PIDController::new(config.lateral)?,
        })
    }

    /// Run one control cycle
    pub fn tick(&mut self, ctx: &mut ServoContext<'_>) -> Result<CycleOutcome> {
        // Single time sample per cycle: both axes must see the same dt
        let now = ctx.clock.now();

        if !self.gate.is_open(now) {
            let remaining = self.gate.remaining(now);
            debug!("Initializing... ({:.2}s remaining)", remaining);
            return Ok(CycleOutcome::Initializing { remaining });
        }

        let transform = match ctx.poses.lookup(&self.reference_frame, &self.target_frame, now) {
            TransformLookup::Found(transform) => transform,
            TransformLookup::NotFound => {
                debug!(
                    "No marker {} found in {}, looking for one...",
                    self.target_frame, self.reference_frame
                );
                return Ok(CycleOutcome::TargetNotFound);
            }
        };

        let errors = TrackingErrors {
            longitudinal: transform.depth(),
            lateral: -transform.lateral(),
        };
        debug!(
            "Deviation from marker: longitudinal={:.4}, lateral={:.4}",
            errors.longitudinal, errors.lateral
        );

        let linear = self.longitudinal.control(errors.longitudinal, now);
        let angular = self.lateral.control(errors.lateral, now);

        let command = match (linear, angular) {
            (Some(linear), Some(angular)) => VelocityCommand::new(linear, angular),
            _ => {
                debug!("Timestamp {:.6} did not advance, command suppressed", now);
                return Ok(CycleOutcome::Suppressed { errors });
            }
        };

        ctx.sink.publish(&command)?;
        debug!(
            "Servo command: v_x={:.3} m/s, omega_z={:.3} rad/s",
            command.linear_velocity, command.angular_velocity
        );

        Ok(CycleOutcome::Commanded { errors, command })
    }

    pub fn gate(&self) -> &WarmupGate {
        &self.gate
    }

    pub fn longitudinal(&self) -> &PIDController {
        &self.longitudinal
    }

    pub fn lateral(&self) -> &PIDController {
        &self.lateral
    }
}
