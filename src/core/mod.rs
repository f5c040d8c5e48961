//! Core logger types and traits

pub mod admission;
pub mod async_op;
pub mod config;
pub mod error;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod pattern;
pub mod registry;
pub mod ring_buffer;
pub mod sink;
pub mod sink_manager;
pub mod worker;

pub use admission::{AdmissionPolicy, BlockOnFull, DiscardOnFull, OverflowStrategy};
pub use async_op::AsyncOp;
pub use config::{AsyncConfig, RegistryConfig, DEFAULT_LOGGER_NAME, DEFAULT_QUEUE_CAPACITY};
pub use error::{LoggerError, Result};
pub use log_level::LogLevel;
pub use log_record::{DeferredMessage, LogRecord, Payload, SourceLocation};
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use pattern::{PatternFormatter, DEFAULT_PATTERN};
pub use registry::{Registry, DEFAULT_CONSOLE_SINK_NAME};
pub use ring_buffer::{Consumer, Reservation, RingBuffer, MIN_CAPACITY};
pub use sink::{LevelFilter, Sink};
pub use sink_manager::SinkManager;
pub use worker::{spawn_dispatcher, AsyncDispatcher, Worker, WORKER_THREAD_NAME};
