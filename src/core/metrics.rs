//! Logger metrics for observability
//!
//! Counters for the async pipeline: records accepted into and rejected from
//! the ring, records dispatched by the worker, and sink failures. Rejections
//! are never reported through the logger itself; they only show up here.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use ringlog::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_rejected();
/// metrics.record_accepted();
///
/// assert_eq!(metrics.rejected_count(), 1);
/// assert_eq!(metrics.accepted_count(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records admitted into the queue
    accepted: AtomicU64,

    /// Records dropped by the discard policy, or pushed after stop
    rejected: AtomicU64,

    /// Records handed to a sink manager
    dispatched: AtomicU64,

    /// Sink writes that returned an error
    sink_errors: AtomicU64,

    /// Sink writes or dispatches that panicked
    sink_panics: AtomicU64,

    /// Times the idle worker was woken by a producer
    wakeups: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
            sink_errors: AtomicU64::new(0),
            sink_panics: AtomicU64::new(0),
            wakeups: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn accepted_count(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dispatched_count(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_error_count(&self) -> u64 {
        self.sink_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_panic_count(&self) -> u64 {
        self.sink_panics.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn wakeup_count(&self) -> u64 {
        self.wakeups.load(Ordering::Relaxed)
    }

    /// Record an admitted record; returns the previous count
    #[inline]
    pub fn record_accepted(&self) -> u64 {
        self.accepted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rejected(&self) -> u64 {
        self.rejected.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_error(&self) -> u64 {
        self.sink_errors.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_panic(&self) -> u64 {
        self.sink_panics.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_wakeup(&self) -> u64 {
        self.wakeups.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been pushed.
    pub fn drop_rate(&self) -> f64 {
        let rejected = self.rejected_count() as f64;
        let total = self.accepted_count() as f64 + rejected;
        if total == 0.0 {
            0.0
        } else {
            (rejected / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.accepted.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
        self.dispatched.store(0, Ordering::Relaxed);
        self.sink_errors.store(0, Ordering::Relaxed);
        self.sink_panics.store(0, Ordering::Relaxed);
        self.wakeups.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            accepted: AtomicU64::new(self.accepted_count()),
            rejected: AtomicU64::new(self.rejected_count()),
            dispatched: AtomicU64::new(self.dispatched_count()),
            sink_errors: AtomicU64::new(self.sink_error_count()),
            sink_panics: AtomicU64::new(self.sink_panic_count()),
            wakeups: AtomicU64::new(self.wakeup_count()),
        }
    }
}
