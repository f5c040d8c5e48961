//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. They record the
//! call site (`file!()`, `line!()`, `module_path!()`) and skip formatting
//! entirely when the logger's level filters the record out.
//!
//! # Examples
//!
//! ```
//! use ringlog::prelude::*;
//! use ringlog::info;
//!
//! let logger = Logger::new("app");
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Call-site location of the macro invocation.
#[doc(hidden)]
#[macro_export]
macro_rules! __source_location {
    () => {
        $crate::SourceLocation::new(file!(), line!(), module_path!())
    };
}

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use ringlog::prelude::*;
/// # let logger = Logger::new("app");
/// use ringlog::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let __level = $level;
        let __logger = &$logger;
        if __logger.should_log(__level) {
            __logger.log_at(__level, $crate::__source_location!(), format!($($arg)+));
        }
    }};
}

/// Log a message whose formatting runs on the dispatching thread.
///
/// Arguments are moved into a closure, so they must be `Send + 'static`.
/// With an async logger the caller only pays for the move.
///
/// # Examples
///
/// ```
/// # use ringlog::prelude::*;
/// # let logger = Logger::new("app");
/// use ringlog::log_deferred;
/// let batch = vec![1, 2, 3];
/// log_deferred!(logger, LogLevel::Info, "processed batch {:?}", batch);
/// ```
#[macro_export]
macro_rules! log_deferred {
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let __level = $level;
        let __logger = &$logger;
        if __logger.should_log(__level) {
            __logger.log_deferred_at(
                __level,
                $crate::__source_location!(),
                $crate::__deferred_closure!($fmt $(, $arg)*),
            );
        }
    }};
}

/// Builds the `move` closure used by `log_deferred!`.
///
/// Each argument is evaluated once, in order, and bound to a local that the
/// closure then owns. Every recursion step introduces its own `__arg`, which
/// hygiene keeps distinct from the ones bound by outer steps.
#[doc(hidden)]
#[macro_export]
macro_rules! __deferred_closure {
    (@bind [$($bound:ident)*] $fmt:literal ;) => {
        move || format!($fmt $(, $bound)*)
    };
    (@bind [$($bound:ident)*] $fmt:literal ; $head:expr $(, $tail:expr)*) => {{
        let __arg = $head;
        $crate::__deferred_closure!(@bind [$($bound)* __arg] $fmt ; $($tail),*)
    }};
    ($fmt:literal $(, $arg:expr)*) => {
        $crate::__deferred_closure!(@bind [] $fmt ; $($arg),*)
    };
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use ringlog::prelude::*;
/// # let logger = Logger::new("app");
/// # logger.set_level(LogLevel::Trace);
/// use ringlog::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use ringlog::prelude::*;
/// # let logger = Logger::new("app");
/// use ringlog::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use ringlog::prelude::*;
/// # let logger = Logger::new("app");
/// use ringlog::info;
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use ringlog::prelude::*;
/// # let logger = Logger::new("app");
/// use ringlog::warn;
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use ringlog::prelude::*;
/// # let logger = Logger::new("app");
/// use ringlog::error;
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
///
/// # Examples
///
/// ```
/// # use ringlog::prelude::*;
/// # let logger = Logger::new("app");
/// use ringlog::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}
