//! Registry of named loggers sharing one worker
//!
//! The registry is an ordinary owned value: construct one at startup, hand
//! out `Arc<Logger>`s, and drop it (or call [`Registry::shutdown`]) to drain
//! and stop the worker. There is no process-wide instance.

use super::{
    config::RegistryConfig,
    error::{LoggerError, Result},
    log_level::LogLevel,
    logger::Logger,
    metrics::LoggerMetrics,
    sink::LevelFilter,
    worker::{spawn_dispatcher, AsyncDispatcher},
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Name of the console sink attached to the default logger
pub const DEFAULT_CONSOLE_SINK_NAME: &str = "console_out";

pub struct Registry {
    pattern: String,
    level: LevelFilter,
    loggers: RwLock<HashMap<String, Arc<Logger>>>,
    default_logger: RwLock<Arc<Logger>>,
    dispatcher: Option<Arc<dyn AsyncDispatcher>>,
    shut_down: AtomicBool,
}

impl Registry {
    /// Registry with [`RegistryConfig::default`]
    pub fn new() -> Result<Self> {
        Self::from_config(RegistryConfig::default())
    }

    /// Validate `config`, start the worker and create the default logger
    ///
    /// # Example
    ///
    /// ```
    /// use ringlog::{Registry, RegistryConfig};
    ///
    /// let registry = Registry::from_config(RegistryConfig::synchronous()).unwrap();
    /// let logger = registry.create_logger("db").unwrap();
    /// logger.info("connected");
    /// registry.shutdown();
    /// ```
    pub fn from_config(config: RegistryConfig) -> Result<Self> {
        config.validate()?;

        let dispatcher = match &config.async_mode {
            Some(async_config) => Some(spawn_dispatcher(
                async_config.queue_capacity,
                async_config.overflow,
            )?),
            None => None,
        };

        let default_logger = Arc::new(Self::make_logger(
            &config.default_logger_name,
            config.level,
            &config.pattern,
            dispatcher.as_ref(),
        ));

        #[cfg(feature = "console")]
        default_logger.add_sink(Arc::new(crate::sinks::ConsoleSink::stdout(
            DEFAULT_CONSOLE_SINK_NAME,
        )));

        let mut loggers = HashMap::new();
        loggers.insert(config.default_logger_name.clone(), Arc::clone(&default_logger));

        Ok(Self {
            pattern: config.pattern,
            level: LevelFilter::new(config.level),
            loggers: RwLock::new(loggers),
            default_logger: RwLock::new(default_logger),
            dispatcher,
            shut_down: AtomicBool::new(false),
        })
    }

    fn make_logger(
        name: &str,
        level: LogLevel,
        pattern: &str,
        dispatcher: Option<&Arc<dyn AsyncDispatcher>>,
    ) -> Logger {
        let logger = match dispatcher {
            Some(dispatcher) => Logger::with_dispatcher(name, Arc::clone(dispatcher)),
            None => Logger::new(name),
        };
        logger.set_level(level);
        logger.set_pattern(pattern);
        logger
    }

    /// Create and register a logger with no sinks
    ///
    /// It inherits the registry's level, pattern and worker.
    pub fn create_logger(&self, name: impl Into<String>) -> Result<Arc<Logger>> {
        if self.is_shut_down() {
            return Err(LoggerError::RegistryShutdown);
        }

        let name = name.into();
        let mut loggers = self.loggers.write();
        if loggers.contains_key(&name) {
            return Err(LoggerError::duplicate_logger(name));
        }

        let logger = Arc::new(Self::make_logger(
            &name,
            self.level.get(),
            &self.pattern,
            self.dispatcher.as_ref(),
        ));
        loggers.insert(name, Arc::clone(&logger));
        Ok(logger)
    }

    pub fn get_logger(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.read().get(name).cloned()
    }

    /// The named logger, or the default one when it does not exist
    pub fn logger_or_default(&self, name: &str) -> Arc<Logger> {
        self.get_logger(name)
            .unwrap_or_else(|| self.default_logger())
    }

    pub fn default_logger(&self) -> Arc<Logger> {
        self.default_logger.read().clone()
    }

    pub fn default_logger_name(&self) -> String {
        self.default_logger.read().name().to_string()
    }

    /// Make an existing logger the default; `false` if no such logger
    pub fn set_default_logger_name(&self, name: &str) -> bool {
        match self.get_logger(name) {
            Some(logger) => {
                *self.default_logger.write() = logger;
                true
            }
            None => false,
        }
    }

    /// Unregister a logger
    ///
    /// The default logger cannot be dropped. Outstanding `Arc`s keep working.
    pub fn drop_logger(&self, name: &str) -> bool {
        let default_logger = self.default_logger.read();
        if default_logger.name() == name {
            return false;
        }
        self.loggers.write().remove(name).is_some()
    }

    /// Registered names, sorted
    pub fn logger_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn level(&self) -> LogLevel {
        self.level.get()
    }

    /// Set the level of every registered logger and of future ones
    pub fn set_level(&self, level: LogLevel) {
        self.level.set(level);
        for logger in self.loggers.read().values() {
            logger.set_level(level);
        }
    }

    /// Flush every logger's sinks; returns the first error
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for logger in self.loggers.read().values() {
            if let Err(e) = logger.flush() {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn is_async(&self) -> bool {
        self.dispatcher.is_some()
    }

    /// Counters of the shared worker, if there is one
    pub fn worker_metrics(&self) -> Option<&Arc<LoggerMetrics>> {
        self.dispatcher.as_ref().map(|d| d.metrics())
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Stop the worker, wait for it to drain, then flush every sink
    ///
    /// Idempotent; also run on drop.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.stop();
            dispatcher.join();

            let rejected = dispatcher.metrics().rejected_count();
            if rejected > 0 {
                eprintln!(
                    "[LOGGER WARNING] Registry shutting down with {} rejected records (drop rate: {:.2}%)",
                    rejected,
                    dispatcher.metrics().drop_rate()
                );
            }
        }

        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("loggers", &self.logger_names())
            .field("default_logger", &self.default_logger_name())
            .field("level", &self.level())
            .field(
                "policy",
                &self.dispatcher.as_ref().map(|d| d.policy_name()),
            )
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
