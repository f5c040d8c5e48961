//! File sink implementation

use crate::core::{LevelFilter, LogLevel, LogRecord, LoggerError, Result, Sink};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct FileSink {
    name: String,
    path: PathBuf,
    level: LevelFilter,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    /// Create or truncate `path`
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(name.into(), path.into(), false)
    }

    /// Open `path` for appending, creating it if missing
    pub fn append(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(name.into(), path.into(), true)
    }

    fn open(name: String, path: PathBuf, append: bool) -> Result<Self> {
        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        let file = options
            .open(&path)
            .map_err(|e| LoggerError::file_sink(path.display().to_string(), e.to_string()))?;

        Ok(Self {
            name,
            path,
            level: LevelFilter::default(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    #[must_use]
    pub fn with_level(self, level: LogLevel) -> Self {
        self.level.set(level);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
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
        self.writer
            .lock()
            .write_all(formatted.as_bytes())
            .map_err(|e| LoggerError::file_sink(self.path.display().to_string(), e.to_string()))
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .flush()
            .map_err(|e| LoggerError::file_sink(self.path.display().to_string(), e.to_string()))
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.writer.get_mut().flush();
    }
}
