//! Latest-transform cache standing in for a tf buffer.
//!
//! The marker detector publishes `StampedTransform`s as they are observed;
//! the buffer keeps the newest one per frame pair and answers
//! "latest available" lookups for the control loop.

use crate::{PoseProvider, StampedTransform, TransformLookup};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct TransformBuffer {
    latest: HashMap<(String, String), StampedTransform>,
    max_age: Option<f64>,
}

impl TransformBuffer {
    pub fn new(max_age: Option<f64>) -> Self {
        Self {
            latest: HashMap::new(),
            max_age,
        }
    }

    /// Store a transform unless a newer one is already held for its frames.
    /// Returns whether the transform was kept.
    pub fn insert(&mut self, stamped: StampedTransform) -> bool {
        let key = (stamped.parent_frame.clone(), stamped.child_frame.clone());

        if let Some(existing) = self.latest.get(&key) {
            if stamped.stamp < existing.stamp {
                debug!(
                    "Dropping stale transform {} -> {} (stamp {:.3} < {:.3})",
                    key.0, key.1, stamped.stamp, existing.stamp
                );
                return false;
            }
        }

        self.latest.insert(key, stamped);
        true
    }

    pub fn latest(&self, reference: &str, target: &str) -> Option<&StampedTransform> {
        self.latest.get(&(reference.to_string(), target.to_string()))
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    pub fn clear(&mut self) {
        self.latest.clear();
    }
}

impl PoseProvider for TransformBuffer {
    fn lookup(&self, reference: &str, target: &str, at_time: f64) -> TransformLookup {
        let stamped = match self.latest(reference, target) {
            Some(stamped) => stamped,
            None => return TransformLookup::NotFound,
        };

        if let Some(max_age) = self.max_age {
            if at_time - stamped.stamp > max_age {
                return TransformLookup::NotFound;
            }
        }

        TransformLookup::Found(stamped.transform)
    }
}
