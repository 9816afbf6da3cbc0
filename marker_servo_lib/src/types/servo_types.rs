use serde::{Deserialize, Serialize};

/// Actuation command for a differential base: forward speed and yaw rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityCommand {
    pub linear_velocity: f64,  // m/s along the body x axis
    pub angular_velocity: f64, // rad/s about the body z axis
}

impl VelocityCommand {
    pub fn new(linear_velocity: f64, angular_velocity: f64) -> Self {
        Self {
            linear_velocity,
            angular_velocity,
        }
    }
}

/// Tracking errors derived from the marker transform on one cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingErrors {
    pub longitudinal: f64, // Depth separation (m)
    pub lateral: f64,      // Signed sideways offset, positive = marker to the left (m)
}

/// Producer tag in the command envelope. The rover controller keys its
/// arbitration logs on this field; this node only ever produces `MarkerServo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InputSource {
    MarkerServo,
}

/// Priority ladder shared by every command producer on the rover.
///
/// The rover controller keeps the latest command per source and forwards the
/// one with the highest priority, so the servo's `High` only means something
/// relative to the other rungs: keyboard and voice control publish `Normal`,
/// emergency stops publish `Emergency`. Variant order is the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CommandPriority {
    Low,
    Normal,
    High,
    Emergency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub command_id: String,
    pub timestamp: i64, // Unix millis
    pub source: InputSource,
    pub priority: CommandPriority,
}

impl CommandMetadata {
    /// Metadata for a freshly generated servo command
    pub fn marker_servo() -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            source: InputSource::MarkerServo,
            // Autonomous tracking sits below emergency stops and above manual control
            priority: CommandPriority::High,
        }
    }
}

/// Envelope placed on the `servo_command` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServoCommandMessage {
    pub command: VelocityCommand,
    pub metadata: CommandMetadata,
}

impl ServoCommandMessage {
    pub fn new(command: VelocityCommand) -> Self {
        Self {
            command,
            metadata: CommandMetadata::marker_servo(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackingState {
    /// Warm-up window still running
    Initializing,
    /// Gate open but no marker transform available
    Searching,
    /// Marker seen but at least one axis produced no output this cycle
    Holding,
    /// Marker seen and a command was published
    Tracking,
}

/// Per-cycle report placed on the `servo_telemetry` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServoTelemetry {
    pub state: TrackingState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<TrackingErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<VelocityCommand>,
    pub timestamp: i64,
}
