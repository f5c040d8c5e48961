//! # ringlog
//!
//! A leveled logging library whose async path hands records from any number
//! of threads to one background worker through a lock-free bounded ring
//! buffer.
//!
//! ## Features
//!
//! - **Lock-free hand-off**: producers reserve and commit ring slots with
//!   atomics only; the worker sleeps on a condvar when idle
//! - **Static admission policies**: [`BlockOnFull`] or [`DiscardOnFull`],
//!   fixed when the queue is built
//! - **Deferred formatting**: [`log_deferred!`] moves its arguments to the
//!   worker and formats there
//! - **Pattern formatting**: `%`-flag patterns compiled once per logger
//! - **Sinks**: console, file and any `Write` stream, each with its own level
//!
//! ## Example
//!
//! ```
//! use ringlog::prelude::*;
//! use ringlog::info;
//!
//! let registry = Registry::new().unwrap();
//! let logger = registry.create_logger("app").unwrap();
//! logger.add_sink(std::sync::Arc::new(StreamSink::new("buffer", Vec::<u8>::new())));
//!
//! info!(logger, "listening on port {}", 8080);
//! registry.shutdown();
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::sinks::{ConsoleSink, ConsoleTarget};
    #[cfg(feature = "file")]
    pub use crate::sinks::FileSink;
    pub use crate::sinks::StreamSink;
    pub use crate::core::{
        AsyncConfig, LogLevel, LogRecord, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
        OverflowStrategy, Registry, RegistryConfig, Result, Sink,
    };
}

pub use core::{
    spawn_dispatcher, AdmissionPolicy, AsyncConfig, AsyncDispatcher, AsyncOp, BlockOnFull,
    Consumer, DiscardOnFull, LevelFilter, LogLevel, LogRecord, Logger, LoggerBuilder, LoggerError,
    LoggerMetrics, OverflowStrategy, PatternFormatter, Registry, RegistryConfig, Reservation,
    Result, RingBuffer, Sink, SinkManager, SourceLocation, Worker, DEFAULT_CONSOLE_SINK_NAME,
    DEFAULT_LOGGER_NAME, DEFAULT_PATTERN, DEFAULT_QUEUE_CAPACITY, MIN_CAPACITY, WORKER_THREAD_NAME,
};
#[cfg(feature = "console")]
pub use sinks::ConsoleSink;
#[cfg(feature = "file")]
pub use sinks::FileSink;
pub use sinks::StreamSink;
