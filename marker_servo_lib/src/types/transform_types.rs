use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Rigid transform of a child frame expressed in its parent frame.
///
/// On the wire the translation is `[x, y, z]` in meters and the rotation is
/// a unit quaternion `[x, y, z, w]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vector3<f64>,
    #[serde(default = "UnitQuaternion::identity")]
    pub rotation: UnitQuaternion<f64>,
}

impl Transform {
    pub fn new(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self { translation, rotation }
    }

    /// Pure translation (identity rotation)
    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            translation: Vector3::new(x, y, z),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Separation along the optical axis (camera z)
    pub fn depth(&self) -> f64 {
        self.translation.z
    }

    /// Sideways offset along camera x
    pub fn lateral(&self) -> f64 {
        self.translation.x
    }
}

/// Transform as published by the marker detector, tagged with its frames.
///
/// `stamp` is seconds on the controller clock; the servo node overwrites it
/// with the arrival time, so detectors may omit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampedTransform {
    pub parent_frame: String,
    pub child_frame: String,
    #[serde(default)]
    pub stamp: f64,
    pub transform: Transform,
}

impl StampedTransform {
    pub fn new(
        parent_frame: impl Into<String>,
        child_frame: impl Into<String>,
        stamp: f64,
        transform: Transform,
    ) -> Self {
        Self {
            parent_frame: parent_frame.into(),
            child_frame: child_frame.into(),
            stamp,
            transform,
        }
    }
}

/// Result of asking the pose provider for a frame pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformLookup {
    Found(Transform),
    NotFound,
}

impl TransformLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, TransformLookup::Found(_))
    }
}

impl From<Option<Transform>> for TransformLookup {
    fn from(value: Option<Transform>) -> Self {
        match value {
            Some(transform) => TransformLookup::Found(transform),
            None => TransformLookup::NotFound,
        }
    }
}
