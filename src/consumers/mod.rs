//! Consumer implementations

pub mod buffer;
pub mod console;
pub mod file;
pub mod rotating_file;
pub mod rotation;

pub use buffer::BufferConsumer;
pub use console::ConsoleConsumer;
pub use file::FileConsumer;
pub use rotating_file::{RotatingFileConsumer, Rotation, RotationState};
pub use rotation::{RotationPolicy, StartupRotationPolicy, TemporalRotationPolicy, TimeField};
