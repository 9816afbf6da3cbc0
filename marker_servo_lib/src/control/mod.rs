pub mod cadence;
pub mod error_history;
pub mod gate;
pub mod pid;
pub mod servo_loop;

pub use cadence::*;
pub use error_history::*;
pub use gate::*;
pub use pid::*;
pub use servo_loop::*;
