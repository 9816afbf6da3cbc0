//! # Marker Servo Library
//!
//! Control law and shared types for the marker-following servo node.
//! The dora node binary is a thin adapter around [`DualAxisControlLoop`];
//! everything that decides what the rover does lives here.

pub mod control;
pub mod types;
pub mod utils;

// Re-export everything for convenience
pub use control::*;
pub use types::*;
pub use utils::*;
