//! Sink over an arbitrary writer

use crate::core::{LevelFilter, LogLevel, LogRecord, LoggerError, Result, Sink};
use parking_lot::Mutex;
use std::io::Write;

/// Writes formatted records to any `Write + Send` target
///
/// # Example
///
/// ```
/// use ringlog::sinks::StreamSink;
///
/// let sink = StreamSink::new("buffer", Vec::<u8>::new());
/// ```
pub struct StreamSink {
    name: String,
    level: LevelFilter,
    stream: Mutex<Box<dyn Write + Send>>,
}

impl StreamSink {
    pub fn new<W: Write + Send + 'static>(name: impl Into<String>, stream: W) -> Self {
        Self {
            name: name.into(),
            level: LevelFilter::default(),
            stream: Mutex::new(Box::new(stream)),
        }
    }

    #[must_use]
    pub fn with_level(self, level: LogLevel) -> Self {
        self.level.set(level);
        self
    }
}

impl Sink for StreamSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn level(&self) -> LogLevel {
        self.level.get()
    }

    fn set_level(&self, level: LogLevel) {
        self.level.set(level);
    }

    fn write(&self, _record: &LogRecord, formatted: &str) -> Result<()> {
        self.stream
            .lock()
            .write_all(formatted.as_bytes())
            .map_err(|e| LoggerError::io_operation("writing to stream", self.name.clone(), e))
    }

    fn flush(&self) -> Result<()> {
        self.stream.lock().flush()?;
        Ok(())
    }
}

impl Drop for StreamSink {
    fn drop(&mut self) {
        let _ = self.stream.get_mut().flush();
    }
}
