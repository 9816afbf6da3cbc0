pub mod clock;
pub mod logging;
pub mod transform_buffer;

pub use clock::*;
pub use logging::*;
pub use transform_buffer::*;
