//! Shared helpers for integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use ringlog::{LevelFilter, LogLevel, LogRecord, Result, Sink};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Collects rendered messages for later inspection
pub struct VectorSink {
    name: String,
    level: LevelFilter,
    messages: Mutex<Vec<String>>,
    lines: Mutex<Vec<String>>,
    threads: Mutex<Vec<Option<String>>>,
    write_delay: Option<Duration>,
}

impl VectorSink {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self::build(name, None))
    }

    /// A sink that sleeps for `delay` on every write
    pub fn slow(name: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self::build(name, Some(delay)))
    }

    fn build(name: &str, write_delay: Option<Duration>) -> Self {
        Self {
            name: name.to_string(),
            level: LevelFilter::default(),
            messages: Mutex::new(Vec::new()),
            lines: Mutex::new(Vec::new()),
            threads: Mutex::new(Vec::new()),
            write_delay,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Pattern-formatted output, one entry per write
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Names of the threads that performed each write
    pub fn writer_threads(&self) -> Vec<Option<String>> {
        self.threads.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
        self.lines.lock().clear();
        self.threads.lock().clear();
    }

    /// Wait up to five seconds for at least `count` messages
    pub fn wait_for(&self, count: usize) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if self.len() >= count {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        self.len() >= count
    }
}

impl Sink for VectorSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn level(&self) -> LogLevel {
        self.level.get()
    }

    fn set_level(&self, level: LogLevel) {
        self.level.set(level);
    }

    fn write(&self, record: &LogRecord, formatted: &str) -> Result<()> {
        if let Some(delay) = self.write_delay {
            thread::sleep(delay);
        }
        self.threads
            .lock()
            .push(thread::current().name().map(str::to_string));
        self.lines.lock().push(formatted.to_string());
        self.messages
            .lock()
            .push(record.message().unwrap_or_default().to_string());
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// A sink that panics on every write
pub struct PanickingSink;

impl Sink for PanickingSink {
    fn name(&self) -> &str {
        "panicking"
    }

    fn level(&self) -> LogLevel {
        LogLevel::Trace
    }

    fn set_level(&self, _level: LogLevel) {}

    fn write(&self, _record: &LogRecord, _formatted: &str) -> Result<()> {
        panic!("sink failure for testing");
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
