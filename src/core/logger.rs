//! Main logger implementation

use super::{
    admission::OverflowStrategy,
    config::AsyncConfig,
    error::{LoggerError, Result},
    log_level::LogLevel,
    log_record::{LogRecord, SourceLocation},
    metrics::LoggerMetrics,
    sink::{LevelFilter, Sink},
    sink_manager::SinkManager,
    worker::{spawn_dispatcher, AsyncDispatcher},
};
use std::fmt;
use std::sync::Arc;

/// Named front end that filters, builds and routes records
///
/// A synchronous logger dispatches on the calling thread. An async logger
/// hands records to its [`AsyncDispatcher`] and returns as soon as the
/// record is in the ring.
pub struct Logger {
    name: Arc<str>,
    level: LevelFilter,
    sink_manager: Arc<SinkManager>,
    dispatcher: Option<Arc<dyn AsyncDispatcher>>,
    /// Shared with the sink manager, so dispatch and sink failures land here too
    metrics: Arc<LoggerMetrics>,
}

impl Logger {
    /// Synchronous logger with no sinks, at `Info`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::assemble(name.into(), LogLevel::Info, None)
    }

    /// Logger that submits through an existing worker
    #[must_use]
    pub fn with_dispatcher(name: impl Into<String>, dispatcher: Arc<dyn AsyncDispatcher>) -> Self {
        Self::assemble(name.into(), LogLevel::Info, Some(dispatcher))
    }

    fn assemble(
        name: String,
        level: LogLevel,
        dispatcher: Option<Arc<dyn AsyncDispatcher>>,
    ) -> Self {
        let metrics = Arc::new(LoggerMetrics::new());
        Self {
            name: Arc::from(name),
            level: LevelFilter::new(level),
            sink_manager: Arc::new(SinkManager::with_metrics(Arc::clone(&metrics))),
            dispatcher,
            metrics,
        }
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use ringlog::prelude::*;
    ///
    /// let logger = Logger::builder("app")
    ///     .level(LogLevel::Debug)
    ///     .async_mode(1024)
    ///     .build()
    ///     .unwrap();
    /// assert!(logger.is_async());
    /// ```
    #[must_use]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        self.level.get()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.set(level);
    }

    #[inline]
    pub fn should_log(&self, level: LogLevel) -> bool {
        level >= self.level.get()
    }

    pub fn is_async(&self) -> bool {
        self.dispatcher.is_some()
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if !self.should_log(level) {
            return;
        }
        self.submit(LogRecord::new(level, message));
    }

    /// Log with the call site attached, as the macros do
    pub fn log_at(&self, level: LogLevel, location: SourceLocation, message: impl Into<String>) {
        if !self.should_log(level) {
            return;
        }
        self.submit(LogRecord::new(level, message).with_location(location));
    }

    /// Log a message rendered later, on the dispatching thread
    ///
    /// For an async logger the closure runs on the worker, so the caller
    /// pays only for moving its captures.
    pub fn log_deferred<F>(&self, level: LogLevel, render: F)
    where
        F: FnOnce() -> String + Send + 'static,
    {
        if !self.should_log(level) {
            return;
        }
        self.submit(LogRecord::deferred(level, render));
    }

    pub fn log_deferred_at<F>(&self, level: LogLevel, location: SourceLocation, render: F)
    where
        F: FnOnce() -> String + Send + 'static,
    {
        if !self.should_log(level) {
            return;
        }
        self.submit(LogRecord::deferred(level, render).with_location(location));
    }

    /// Submit a prebuilt record; it is stamped with this logger's name
    pub fn log_record(&self, record: LogRecord) {
        if !self.should_log(record.level) {
            return;
        }
        self.submit(record);
    }

    fn submit(&self, record: LogRecord) {
        let record = record.with_logger_name(Arc::clone(&self.name));

        match &self.dispatcher {
            Some(dispatcher) => {
                if dispatcher.push(record, &self.sink_manager) {
                    self.metrics.record_accepted();
                } else {
                    self.metrics.record_rejected();
                }
            }
            None => {
                self.metrics.record_accepted();
                self.sink_manager.dispatch(record);
            }
        }
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }

    /// Attach a sink; returns `false` if the name is taken
    pub fn add_sink(&self, sink: Arc<dyn Sink>) -> bool {
        self.sink_manager.add_sink(sink)
    }

    pub fn try_add_sink(&self, sink: Arc<dyn Sink>) -> Result<()> {
        self.sink_manager.try_add_sink(sink)
    }

    pub fn remove_sink(&self, name: &str) -> bool {
        self.sink_manager.remove_sink(name)
    }

    pub fn get_sink(&self, name: &str) -> Option<Arc<dyn Sink>> {
        self.sink_manager.get_sink(name)
    }

    pub fn has_sink(&self, name: &str) -> bool {
        self.sink_manager.has_sink(name)
    }

    pub fn sinks(&self) -> Vec<Arc<dyn Sink>> {
        self.sink_manager.sinks()
    }

    pub fn set_pattern(&self, pattern: &str) {
        self.sink_manager.set_pattern(pattern);
    }

    pub fn pattern(&self) -> String {
        self.sink_manager.pattern()
    }

    /// Add a `%<flag>` to this logger's pattern language
    ///
    /// See [`PatternFormatter::register_flag`](super::pattern::PatternFormatter::register_flag).
    pub fn register_flag<F>(&self, flag: char, render: F) -> bool
    where
        F: Fn(&LogRecord, &mut String) + Send + Sync + 'static,
    {
        self.sink_manager.register_flag(flag, render)
    }

    /// Flush every sink
    ///
    /// Records still queued for the worker are not waited for; stop the
    /// worker (or shut the registry down) for that.
    pub fn flush(&self) -> Result<()> {
        self.sink_manager.flush()
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use ringlog::Logger;
    ///
    /// let logger = Logger::new("app");
    /// logger.info("hello");
    ///
    /// let metrics = logger.metrics();
    /// println!("Rejected: {}", metrics.rejected_count());
    /// println!("Drop rate: {:.2}%", metrics.drop_rate());
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn sink_manager(&self) -> &Arc<SinkManager> {
        &self.sink_manager
    }

    pub fn dispatcher(&self) -> Option<&Arc<dyn AsyncDispatcher>> {
        self.dispatcher.as_ref()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("async", &self.is_async())
            .field("sinks", &self.sink_manager)
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use ringlog::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder("app")
///     .level(LogLevel::Debug)
///     .pattern("[%l] %v\n")
///     .sink(StreamSink::new("buffer", Vec::<u8>::new()))
///     .async_mode(1024)
///     .overflow(OverflowStrategy::Discard)
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    name: String,
    level: LogLevel,
    pattern: Option<String>,
    sinks: Vec<Arc<dyn Sink>>,
    async_config: Option<AsyncConfig>,
    dispatcher: Option<Arc<dyn AsyncDispatcher>>,
}

impl LoggerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: LogLevel::Info,
            pattern: None,
            sinks: Vec::new(),
            async_config: None,
            dispatcher: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Add a sink that is also held elsewhere
    #[must_use = "builder methods return a new value"]
    pub fn shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Give this logger its own worker with `queue_capacity` slots
    ///
    /// If not called, the logger dispatches synchronously.
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(mut self, queue_capacity: usize) -> Self {
        let config = self.async_config.get_or_insert_with(AsyncConfig::default);
        config.queue_capacity = queue_capacity;
        self
    }

    /// Admission policy for the worker created by [`async_mode`](Self::async_mode)
    #[must_use = "builder methods return a new value"]
    pub fn overflow(mut self, overflow: OverflowStrategy) -> Self {
        let config = self.async_config.get_or_insert_with(AsyncConfig::default);
        config.overflow = overflow;
        self
    }

    /// Submit through an existing worker; takes precedence over `async_mode`
    #[must_use = "builder methods return a new value"]
    pub fn dispatcher(mut self, dispatcher: Arc<dyn AsyncDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Build the Logger
    ///
    /// Fails on an invalid queue capacity or duplicate sink names.
    pub fn build(self) -> Result<Logger> {
        let dispatcher = match (self.dispatcher, self.async_config) {
            (Some(dispatcher), _) => Some(dispatcher),
            (None, Some(config)) => {
                config.validate()?;
                Some(spawn_dispatcher(config.queue_capacity, config.overflow)?)
            }
            (None, None) => None,
        };

        let logger = Logger::assemble(self.name, self.level, dispatcher);
        if let Some(pattern) = &self.pattern {
            logger.set_pattern(pattern);
        }
        for sink in self.sinks {
            let name = sink.name().to_string();
            if !logger.add_sink(sink) {
                return Err(LoggerError::duplicate_sink(name));
            }
        }

        Ok(logger)
    }
}
