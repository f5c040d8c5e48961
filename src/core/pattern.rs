//! Pattern formatter
//!
//! Compiles a `%`-flag pattern into a list of steps once, then renders
//! records by walking the list. Unknown flags are kept as literal text.
//!
//! | Flag | Output                              |
//! |------|-------------------------------------|
//! | `%v` | message                             |
//! | `%l` | level name (`INFO`)                 |
//! | `%L` | level initial (`I`)                 |
//! | `%t` | thread id                           |
//! | `%n` | logger name                         |
//! | `%Y` `%m` `%d` | local year, month, day    |
//! | `%H` `%M` `%S` | local hour, minute, second|
//! | `%e` | milliseconds (3 digits)             |
//! | `%f` | microseconds (6 digits)             |
//! | `%s` | source file name                    |
//! | `%g` | source file path                    |
//! | `%#` | source line                         |
//! | `%!` | module path                         |
//! | `%%` | a literal `%`                       |
//!
//! Further flags can be added per formatter with
//! [`PatternFormatter::register_flag`].

use super::log_record::LogRecord;
use chrono::{DateTime, Datelike, Local, Timelike};
use std::collections::HashMap;
use std::fmt::{self, Write};
use std::ops::Range;
use std::sync::Arc;

pub const DEFAULT_PATTERN: &str = "[%Y-%m-%d %H:%M:%S.%e] [%l] %v\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Message,
    Level,
    LevelShort,
    ThreadId,
    LoggerName,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Millis,
    Micros,
    SourceFile,
    SourcePath,
    SourceLine,
    ModulePath,
}

impl Flag {
    fn from_char(c: char) -> Option<Self> {
        let flag = match c {
            'v' => Flag::Message,
            'l' => Flag::Level,
            'L' => Flag::LevelShort,
            't' => Flag::ThreadId,
            'n' => Flag::LoggerName,
            'Y' => Flag::Year,
            'm' => Flag::Month,
            'd' => Flag::Day,
            'H' => Flag::Hour,
            'M' => Flag::Minute,
            'S' => Flag::Second,
            'e' => Flag::Millis,
            'f' => Flag::Micros,
            's' => Flag::SourceFile,
            'g' => Flag::SourcePath,
            '#' => Flag::SourceLine,
            '!' => Flag::ModulePath,
            _ => return None,
        };
        Some(flag)
    }

    fn needs_time(self) -> bool {
        matches!(
            self,
            Flag::Year
                | Flag::Month
                | Flag::Day
                | Flag::Hour
                | Flag::Minute
                | Flag::Second
                | Flag::Millis
                | Flag::Micros
        )
    }
}

/// Renderer for a user-registered flag
pub type FlagFn = dyn Fn(&LogRecord, &mut String) + Send + Sync;

#[derive(Clone)]
struct CustomFlag {
    flag: char,
    render: Arc<FlagFn>,
}

impl fmt::Debug for CustomFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomFlag('{}')", self.flag)
    }
}

impl PartialEq for CustomFlag {
    fn eq(&self, other: &Self) -> bool {
        self.flag == other.flag && Arc::ptr_eq(&self.render, &other.render)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FormatStep {
    Literal(String),
    Flag(Flag),
    Custom(CustomFlag),
}

#[derive(Debug, Clone)]
pub struct PatternFormatter {
    pattern: String,
    steps: Vec<FormatStep>,
    needs_time: bool,
    custom_flags: HashMap<char, CustomFlag>,
}

impl PatternFormatter {
    pub fn new(pattern: &str) -> Self {
        let mut formatter = Self {
            pattern: String::new(),
            steps: Vec::new(),
            needs_time: false,
            custom_flags: HashMap::new(),
        };
        formatter.set_pattern(pattern);
        formatter
    }

    pub fn set_pattern(&mut self, pattern: &str) {
        self.pattern = pattern.to_string();
        self.recompile();
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Bind `%<flag>` to `render` for this formatter
    ///
    /// A registered flag shadows a built-in one with the same character.
    /// `%` stays the escape for a literal percent and cannot be registered;
    /// returns `false` in that case.
    ///
    /// # Example
    ///
    /// ```
    /// use ringlog::{LogLevel, LogRecord, PatternFormatter};
    ///
    /// let mut formatter = PatternFormatter::new("[%X] %v");
    /// formatter.register_flag('X', |_record, dest| dest.push_str("CUSTOM"));
    ///
    /// let record = LogRecord::new(LogLevel::Info, "hi");
    /// assert_eq!(formatter.format_to_string(&record), "[CUSTOM] hi");
    /// ```
    pub fn register_flag<F>(&mut self, flag: char, render: F) -> bool
    where
        F: Fn(&LogRecord, &mut String) + Send + Sync + 'static,
    {
        if flag == '%' {
            return false;
        }
        self.custom_flags.insert(
            flag,
            CustomFlag {
                flag,
                render: Arc::new(render),
            },
        );
        self.recompile();
        true
    }

    fn recompile(&mut self) {
        self.steps = self.compile(&self.pattern);
        self.needs_time = self.steps.iter().any(|step| match step {
            FormatStep::Flag(flag) => flag.needs_time(),
            FormatStep::Literal(_) | FormatStep::Custom(_) => false,
        });
    }

    fn resolve(&self, c: char) -> Option<FormatStep> {
        if let Some(custom) = self.custom_flags.get(&c) {
            return Some(FormatStep::Custom(custom.clone()));
        }
        Flag::from_char(c).map(FormatStep::Flag)
    }

    fn compile(&self, pattern: &str) -> Vec<FormatStep> {
        let mut steps = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }

            match chars.next() {
                Some('%') => literal.push('%'),
                Some(next) => match self.resolve(next) {
                    Some(step) => {
                        if !literal.is_empty() {
                            steps.push(FormatStep::Literal(std::mem::take(&mut literal)));
                        }
                        steps.push(step);
                    }
                    None => {
                        literal.push('%');
                        literal.push(next);
                    }
                },
                None => literal.push('%'),
            }
        }

        if !literal.is_empty() {
            steps.push(FormatStep::Literal(literal));
        }
        steps
    }

    /// Append the formatted record to `dest`
    ///
    /// A deferred payload must be rendered beforehand; otherwise `%v`
    /// produces nothing.
    pub fn format(&self, record: &LogRecord, dest: &mut String) {
        self.format_with_level_span(record, dest);
    }

    /// Like [`format`](Self::format), also returning the byte range in
    /// `dest` written by the first `%l`
    pub fn format_with_level_span(
        &self,
        record: &LogRecord,
        dest: &mut String,
    ) -> Option<Range<usize>> {
        let local: Option<DateTime<Local>> = self
            .needs_time
            .then(|| record.timestamp.with_timezone(&Local));
        let mut level_span = None;

        for step in &self.steps {
            match step {
                FormatStep::Literal(text) => dest.push_str(text),
                FormatStep::Flag(Flag::Level) if level_span.is_none() => {
                    let start = dest.len();
                    dest.push_str(record.level.to_str());
                    level_span = Some(start..dest.len());
                }
                FormatStep::Flag(flag) => Self::format_flag(*flag, record, local.as_ref(), dest),
                FormatStep::Custom(custom) => (custom.render)(record, dest),
            }
        }
        level_span
    }

    pub fn format_to_string(&self, record: &LogRecord) -> String {
        let mut dest = String::with_capacity(128);
        self.format(record, &mut dest);
        dest
    }

    fn format_flag(
        flag: Flag,
        record: &LogRecord,
        local: Option<&DateTime<Local>>,
        dest: &mut String,
    ) {
        // Writing into a String cannot fail
        let _ = match (flag, local) {
            (Flag::Message, _) => {
                dest.push_str(record.message().unwrap_or_default());
                Ok(())
            }
            (Flag::Level, _) => {
                dest.push_str(record.level.to_str());
                Ok(())
            }
            (Flag::LevelShort, _) => {
                dest.push(record.level.initial());
                Ok(())
            }
            (Flag::ThreadId, _) => write!(dest, "{}", record.thread_id),
            (Flag::LoggerName, _) => {
                dest.push_str(&record.logger_name);
                Ok(())
            }
            (Flag::SourceFile, _) => {
                if let Some(location) = record.location {
                    dest.push_str(location.basename());
                }
                Ok(())
            }
            (Flag::SourcePath, _) => {
                if let Some(location) = record.location {
                    dest.push_str(location.file);
                }
                Ok(())
            }
            (Flag::SourceLine, _) => match record.location {
                Some(location) => write!(dest, "{}", location.line),
                None => Ok(()),
            },
            (Flag::ModulePath, _) => {
                if let Some(location) = record.location {
                    dest.push_str(location.module_path);
                }
                Ok(())
            }
            (Flag::Year, Some(t)) => write!(dest, "{:04}", t.year()),
            (Flag::Month, Some(t)) => write!(dest, "{:02}", t.month()),
            (Flag::Day, Some(t)) => write!(dest, "{:02}", t.day()),
            (Flag::Hour, Some(t)) => write!(dest, "{:02}", t.hour()),
            (Flag::Minute, Some(t)) => write!(dest, "{:02}", t.minute()),
            (Flag::Second, Some(t)) => write!(dest, "{:02}", t.second()),
            // nanosecond() exceeds 1e9 during a leap second
            (Flag::Millis, Some(t)) => write!(dest, "{:03}", (t.nanosecond() / 1_000_000) % 1000),
            (Flag::Micros, Some(t)) => write!(dest, "{:06}", (t.nanosecond() / 1_000) % 1_000_000),
            (_, None) => Ok(()),
        };
    }
}

impl Default for PatternFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN)
    }
}
