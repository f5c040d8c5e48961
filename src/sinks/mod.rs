//! Sink implementations

#[cfg(feature = "console")]
pub mod console;
#[cfg(feature = "file")]
pub mod file;
pub mod stream;

#[cfg(feature = "console")]
pub use console::{ConsoleSink, ConsoleTarget};
#[cfg(feature = "file")]
pub use file::FileSink;
pub use stream::StreamSink;

pub use crate::core::Sink;
