pub mod command;
pub mod constants;
pub mod error;
pub mod log;
pub mod types;

pub use command::Command;
pub use error::{Error, Result};
pub use log::{LogSink, MemoryLogSink, NullLogSink};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
