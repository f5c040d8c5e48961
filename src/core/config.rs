//! Registry configuration
//!
//! Loaded from JSON or built in code. Everything here is fixed at
//! construction: the queue capacity and overflow strategy cannot change
//! once the worker is running.

use super::{
    admission::OverflowStrategy,
    error::{LoggerError, Result},
    log_level::LogLevel,
    pattern::DEFAULT_PATTERN,
    ring_buffer::MIN_CAPACITY,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_QUEUE_CAPACITY: usize = 8192;
pub const DEFAULT_LOGGER_NAME: &str = "default";

/// Settings for the shared async worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsyncConfig {
    /// Ring buffer slots; a power of two, at least 2
    pub queue_capacity: usize,
    pub overflow: OverflowStrategy,
}

impl Default for AsyncConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            overflow: OverflowStrategy::default(),
        }
    }
}

impl AsyncConfig {
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity < MIN_CAPACITY || !self.queue_capacity.is_power_of_two() {
            return Err(LoggerError::config(
                "AsyncConfig",
                format!(
                    "queue_capacity must be a power of two of at least {}, got {}",
                    MIN_CAPACITY, self.queue_capacity
                ),
            ));
        }
        Ok(())
    }
}

/// Settings for a [`Registry`](super::registry::Registry)
///
/// `async_mode: None` makes every logger dispatch on the calling thread.
///
/// # Example
///
/// ```
/// use ringlog::{LogLevel, OverflowStrategy, RegistryConfig};
///
/// let config = RegistryConfig::from_json_str(
///     r#"{ "level": "Debug", "async_mode": { "queue_capacity": 1024, "overflow": "discard" } }"#,
/// ).unwrap();
///
/// assert_eq!(config.level, LogLevel::Debug);
/// assert_eq!(config.async_mode.unwrap().overflow, OverflowStrategy::Discard);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub default_logger_name: String,
    /// Initial level for loggers created by the registry
    pub level: LogLevel,
    pub pattern: String,
    pub async_mode: Option<AsyncConfig>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_logger_name: DEFAULT_LOGGER_NAME.to_string(),
            level: LogLevel::Trace,
            pattern: DEFAULT_PATTERN.to_string(),
            async_mode: Some(AsyncConfig::default()),
        }
    }
}

impl RegistryConfig {
    /// Configuration with no worker thread
    pub fn synchronous() -> Self {
        Self {
            async_mode: None,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_logger_name.is_empty() {
            return Err(LoggerError::config(
                "RegistryConfig",
                "default_logger_name must not be empty",
            ));
        }
        if let Some(async_config) = &self.async_mode {
            async_config.validate()?;
        }
        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation("reading configuration", path.display().to_string(), e)
        })?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = RegistryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_logger_name, "default");
        assert_eq!(config.async_mode.as_ref().map(|a| a.queue_capacity), Some(8192));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = RegistryConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RegistryConfig::default());
    }

    #[test]
    fn test_null_async_mode_is_synchronous() {
        let config = RegistryConfig::from_json_str(r#"{ "async_mode": null }"#).unwrap();
        assert!(config.async_mode.is_none());
        assert_eq!(config, RegistryConfig::synchronous());
    }

    #[test]
    fn test_rejects_non_power_of_two_capacity() {
        let result =
            RegistryConfig::from_json_str(r#"{ "async_mode": { "queue_capacity": 1000 } }"#);
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_rejects_single_slot_capacity() {
        let result = RegistryConfig::from_json_str(r#"{ "async_mode": { "queue_capacity": 1 } }"#);
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));

        let config = AsyncConfig {
            queue_capacity: 2,
            ..AsyncConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_default_name() {
        let result = RegistryConfig::from_json_str(r#"{ "default_logger_name": "" }"#);
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_malformed_json() {
        let result = RegistryConfig::from_json_str("{ level: ");
        assert!(matches!(result, Err(LoggerError::JsonError(_))));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "default_logger_name": "app", "level": "Warn", "pattern": "%v" }}"#
        )
        .unwrap();

        let config = RegistryConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.default_logger_name, "app");
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.pattern, "%v");
    }

    #[test]
    fn test_from_missing_file() {
        let result = RegistryConfig::from_json_file("/nonexistent/ringlog.json");
        assert!(matches!(result, Err(LoggerError::IoOperation { .. })));
    }
}
