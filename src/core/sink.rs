//! Sink trait for log output destinations

use super::{error::Result, log_level::LogLevel, log_record::LogRecord};
use std::ops::Range;
use std::sync::atomic::{AtomicU8, Ordering};

/// An output destination for formatted records
///
/// Sinks are shared as `Arc<dyn Sink>` between the logger and the async
/// worker, so every method takes `&self`; implementations guard their own
/// writers.
pub trait Sink: Send + Sync {
    fn name(&self) -> &str;

    /// Minimum level this sink accepts
    fn level(&self) -> LogLevel;

    fn set_level(&self, level: LogLevel);

    /// Write one record; `formatted` is the pattern-rendered line
    fn write(&self, record: &LogRecord, formatted: &str) -> Result<()>;

    /// Entry point used by the sink manager
    ///
    /// `level_span` is the byte range of the first `%l` output in
    /// `formatted`, if the pattern has one. Sinks that style the level name
    /// override this; the default ignores the span.
    fn write_with_level_span(
        &self,
        record: &LogRecord,
        formatted: &str,
        level_span: Option<Range<usize>>,
    ) -> Result<()> {
        let _ = level_span;
        self.write(record, formatted)
    }

    fn flush(&self) -> Result<()>;

    fn should_log(&self, level: LogLevel) -> bool {
        level >= self.level()
    }
}

/// Lock-free level threshold shared by the built-in sinks
#[derive(Debug)]
pub struct LevelFilter(AtomicU8);

impl LevelFilter {
    pub const fn new(level: LogLevel) -> Self {
        Self(AtomicU8::new(level as u8))
    }

    #[inline]
    pub fn get(&self) -> LogLevel {
        LogLevel::from_u8(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, level: LogLevel) {
        self.0.store(level as u8, Ordering::Relaxed);
    }
}

impl Default for LevelFilter {
    fn default() -> Self {
        Self::new(LogLevel::Trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        let filter = LevelFilter::default();
        assert_eq!(filter.get(), LogLevel::Trace);
        filter.set(LogLevel::Error);
        assert_eq!(filter.get(), LogLevel::Error);
    }
}
