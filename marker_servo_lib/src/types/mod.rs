pub mod config;
pub mod servo_types;
pub mod transform_types;

pub use config::*;
pub use servo_types::*;
pub use transform_types::*;
