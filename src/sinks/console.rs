//! Console sink implementation

use crate::core::{LevelFilter, LogLevel, LogRecord, Result, Sink};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::{self, Write};
use std::ops::Range;

/// Which standard stream a [`ConsoleSink`] writes to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

pub struct ConsoleSink {
    name: String,
    target: ConsoleTarget,
    use_colors: bool,
    level: LevelFilter,
}

impl ConsoleSink {
    pub fn new(name: impl Into<String>, target: ConsoleTarget) -> Self {
        Self {
            name: name.into(),
            target,
            use_colors: false,
            level: LevelFilter::default(),
        }
    }

    pub fn stdout(name: impl Into<String>) -> Self {
        Self::new(name, ConsoleTarget::Stdout)
    }

    pub fn stderr(name: impl Into<String>) -> Self {
        Self::new(name, ConsoleTarget::Stderr)
    }

    /// Color the `%l` text in each line by severity
    ///
    /// Lines from a pattern without `%l` are written uncolored.
    ///
    /// # Example
    ///
    /// ```
    /// use ringlog::sinks::ConsoleSink;
    ///
    /// let sink = ConsoleSink::stdout("console").with_colors(true);
    /// ```
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn with_level(self, level: LogLevel) -> Self {
        self.level.set(level);
        self
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    fn colorize<'a>(
        &self,
        level: LogLevel,
        formatted: &'a str,
        level_span: Option<Range<usize>>,
    ) -> Cow<'a, str> {
        let span = match level_span {
            Some(span) if self.use_colors => span,
            _ => return Cow::Borrowed(formatted),
        };
        let Some(name) = formatted.get(span.clone()) else {
            return Cow::Borrowed(formatted);
        };

        let colored_name = name.color(level.color_code()).to_string();
        let mut line = String::with_capacity(formatted.len() + colored_name.len());
        line.push_str(&formatted[..span.start]);
        line.push_str(&colored_name);
        line.push_str(&formatted[span.end..]);
        Cow::Owned(line)
    }

    fn write_line(&self, line: &str) -> Result<()> {
        match self.target {
            ConsoleTarget::Stdout => io::stdout().lock().write_all(line.as_bytes())?,
            ConsoleTarget::Stderr => io::stderr().lock().write_all(line.as_bytes())?,
        }
        Ok(())
    }
}

impl Sink for ConsoleSink {
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
        self.write_line(formatted)
    }

    fn write_with_level_span(
        &self,
        record: &LogRecord,
        formatted: &str,
        level_span: Option<Range<usize>>,
    ) -> Result<()> {
        self.write_line(&self.colorize(record.level, formatted, level_span))
    }

    fn flush(&self) -> Result<()> {
        match self.target {
            ConsoleTarget::Stdout => io::stdout().flush()?,
            ConsoleTarget::Stderr => io::stderr().flush()?,
        }
        Ok(())
    }
}
