//! Log record structure

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

// Thread-local cache of thread identity to avoid repeated lookups on the hot path
thread_local! {
    static THREAD_INFO_CACHE: RefCell<Option<(u64, Option<Arc<str>>)>> = const { RefCell::new(None) };
}

/// Process-unique numeric id and name of the calling thread, computed once per thread
pub(crate) fn current_thread_info() -> (u64, Option<Arc<str>>) {
    THREAD_INFO_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| {
                let id = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
                let name = std::thread::current().name().map(Arc::from);
                (id, name)
            })
            .clone()
    })
}

/// Call-site information captured by the logging macros
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
    pub module_path: &'static str,
}

impl SourceLocation {
    pub const fn new(file: &'static str, line: u32, module_path: &'static str) -> Self {
        Self {
            file,
            line,
            module_path,
        }
    }

    /// File name without its directory components
    pub fn basename(&self) -> &'static str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file)
    }
}

/// A message whose rendering is postponed until the record is dispatched
pub struct DeferredMessage(Box<dyn FnOnce() -> String + Send + 'static>);

impl DeferredMessage {
    pub fn new<F>(render: F) -> Self
    where
        F: FnOnce() -> String + Send + 'static,
    {
        Self(Box::new(render))
    }

    fn render(self) -> String {
        (self.0)()
    }
}

impl fmt::Debug for DeferredMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeferredMessage(..)")
    }
}

#[derive(Debug)]
pub enum Payload {
    Rendered(String),
    Deferred(DeferredMessage),
}

#[derive(Debug)]
pub struct LogRecord {
    pub level: LogLevel,
    pub logger_name: Arc<str>,
    pub payload: Payload,
    pub timestamp: DateTime<Utc>,
    pub thread_id: u64,
    pub thread_name: Option<Arc<str>>,
    pub location: Option<SourceLocation>,
}

impl LogRecord {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// to prevent attackers from injecting fake log entries.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    fn with_payload(level: LogLevel, payload: Payload) -> Self {
        let (thread_id, thread_name) = current_thread_info();
        Self {
            level,
            logger_name: Arc::from(""),
            payload,
            timestamp: Utc::now(),
            thread_id,
            thread_name,
            location: None,
        }
    }

    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        let message = Self::sanitize_message(&message.into());
        Self::with_payload(level, Payload::Rendered(message))
    }

    /// Create a record whose message is rendered by the dispatching thread
    pub fn deferred<F>(level: LogLevel, render: F) -> Self
    where
        F: FnOnce() -> String + Send + 'static,
    {
        Self::with_payload(level, Payload::Deferred(DeferredMessage::new(render)))
    }

    pub fn with_logger_name(mut self, name: Arc<str>) -> Self {
        self.logger_name = name;
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self.payload, Payload::Rendered(_))
    }

    /// Resolve a deferred payload in place and return the message text
    pub fn render(&mut self) -> &str {
        if let Payload::Deferred(_) = self.payload {
            let deferred = std::mem::replace(&mut self.payload, Payload::Rendered(String::new()));
            if let Payload::Deferred(message) = deferred {
                self.payload = Payload::Rendered(Self::sanitize_message(&message.render()));
            }
        }
        match &self.payload {
            Payload::Rendered(message) => message,
            Payload::Deferred(_) => "",
        }
    }

    /// Message text if already rendered
    pub fn message(&self) -> Option<&str> {
        match &self.payload {
            Payload::Rendered(message) => Some(message),
            Payload::Deferred(_) => None,
        }
    }
}
