//! Sink manager: formats records and fans them out to sinks

use super::{
    error::{LoggerError, Result},
    log_record::LogRecord,
    metrics::LoggerMetrics,
    pattern::PatternFormatter,
    sink::Sink,
};
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Extract a printable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

struct Inner {
    sinks: Vec<Arc<dyn Sink>>,
    formatter: PatternFormatter,
    buffer: String,
}

/// Owns a logger's sinks and its pattern formatter
///
/// All access to the sink list goes through one mutex, so `dispatch` may be
/// called from the async worker while the owning thread adds or removes
/// sinks.
pub struct SinkManager {
    inner: Mutex<Inner>,
    metrics: Arc<LoggerMetrics>,
}

impl SinkManager {
    pub fn new() -> Self {
        Self::with_metrics(Arc::new(LoggerMetrics::new()))
    }

    pub fn with_metrics(metrics: Arc<LoggerMetrics>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                sinks: Vec::new(),
                formatter: PatternFormatter::default(),
                buffer: String::with_capacity(256),
            }),
            metrics,
        }
    }

    /// Attach a sink; returns `false` if one with the same name exists
    pub fn add_sink(&self, sink: Arc<dyn Sink>) -> bool {
        let mut inner = self.inner.lock();
        if inner.sinks.iter().any(|s| s.name() == sink.name()) {
            return false;
        }
        inner.sinks.push(sink);
        true
    }

    /// Like [`add_sink`](Self::add_sink) but reports duplicates as an error
    pub fn try_add_sink(&self, sink: Arc<dyn Sink>) -> Result<()> {
        let name = sink.name().to_string();
        if self.add_sink(sink) {
            Ok(())
        } else {
            Err(LoggerError::duplicate_sink(name))
        }
    }

    pub fn remove_sink(&self, name: &str) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.sinks.len();
        inner.sinks.retain(|s| s.name() != name);
        inner.sinks.len() != before
    }

    pub fn get_sink(&self, name: &str) -> Option<Arc<dyn Sink>> {
        self.inner
            .lock()
            .sinks
            .iter()
            .find(|s| s.name() == name)
            .cloned()
    }

    pub fn has_sink(&self, name: &str) -> bool {
        self.inner.lock().sinks.iter().any(|s| s.name() == name)
    }

    /// Snapshot of the attached sinks
    pub fn sinks(&self) -> Vec<Arc<dyn Sink>> {
        self.inner.lock().sinks.clone()
    }

    pub fn sink_count(&self) -> usize {
        self.inner.lock().sinks.len()
    }

    pub fn set_pattern(&self, pattern: &str) {
        self.inner.lock().formatter.set_pattern(pattern);
    }

    pub fn pattern(&self) -> String {
        self.inner.lock().formatter.pattern().to_string()
    }

    /// See [`PatternFormatter::register_flag`]
    pub fn register_flag<F>(&self, flag: char, render: F) -> bool
    where
        F: Fn(&LogRecord, &mut String) + Send + Sync + 'static,
    {
        self.inner.lock().formatter.register_flag(flag, render)
    }

    pub fn metrics(&self) -> &Arc<LoggerMetrics> {
        &self.metrics
    }

    /// Render, format and write a record to every sink whose level admits it
    ///
    /// Never panics: a failing or panicking sink is reported on stderr and
    /// the remaining sinks still receive the record.
    pub fn dispatch(&self, mut record: LogRecord) {
        if !record.is_rendered() {
            let rendered = catch_unwind(AssertUnwindSafe(|| {
                record.render();
            }));
            if let Err(panic_info) = rendered {
                self.metrics.record_sink_panic();
                eprintln!(
                    "[LOGGER ERROR] Deferred message for logger '{}' panicked while rendering: {}",
                    record.logger_name,
                    panic_message(panic_info.as_ref())
                );
                return;
            }
        }

        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        inner.buffer.clear();
        let level_span = inner
            .formatter
            .format_with_level_span(&record, &mut inner.buffer);

        for sink in inner.sinks.iter() {
            if !sink.should_log(record.level) {
                continue;
            }

            let result = catch_unwind(AssertUnwindSafe(|| {
                sink.write_with_level_span(&record, &inner.buffer, level_span.clone())
            }));

            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.metrics.record_sink_error();
                    eprintln!("[LOGGER ERROR] Sink '{}' failed: {}", sink.name(), e);
                }
                Err(panic_info) => {
                    self.metrics.record_sink_panic();
                    eprintln!(
                        "[LOGGER CRITICAL] Sink '{}' panicked: {}. \
                         Other sinks continue to function.",
                        sink.name(),
                        panic_message(panic_info.as_ref())
                    );
                }
            }
        }

        self.metrics.record_dispatched();
    }

    /// Flush every sink; returns the first error after attempting all
    pub fn flush(&self) -> Result<()> {
        let inner = self.inner.lock();
        let mut first_error = None;

        for sink in inner.sinks.iter() {
            match catch_unwind(AssertUnwindSafe(|| sink.flush())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Sink '{}' flush failed: {}", sink.name(), e);
                    first_error.get_or_insert(e);
                }
                Err(panic_info) => {
                    self.metrics.record_sink_panic();
                    eprintln!(
                        "[LOGGER CRITICAL] Sink '{}' panicked during flush: {}",
                        sink.name(),
                        panic_message(panic_info.as_ref())
                    );
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for SinkManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SinkManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        let names: Vec<&str> = inner.sinks.iter().map(|s| s.name()).collect();
        f.debug_struct("SinkManager")
            .field("sinks", &names)
            .field("pattern", &inner.formatter.pattern())
            .finish()
    }
}
