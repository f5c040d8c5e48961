//! Background worker draining the async ring buffer
//!
//! One worker owns one ring buffer and one OS thread. Producers push
//! [`AsyncOp`]s without taking a lock; the worker pops and dispatches them,
//! and parks on a condvar only when the ring is empty. The condvar mutex is
//! touched by producers only on the idle to busy transition of `has_work`.

use super::{
    admission::{AdmissionPolicy, BlockOnFull, DiscardOnFull, OverflowStrategy},
    async_op::AsyncOp,
    error::{LoggerError, Result},
    log_record::LogRecord,
    metrics::LoggerMetrics,
    ring_buffer::RingBuffer,
    sink_manager::{panic_message, SinkManager},
};
use parking_lot::{Condvar, Mutex};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub const WORKER_THREAD_NAME: &str = "ringlog-worker";

/// Object-safe view of a [`Worker`] with its policy erased
///
/// Loggers and the registry hold the worker through this trait so that the
/// overflow strategy can be picked from configuration, while the drain loop
/// itself stays monomorphized over the policy.
pub trait AsyncDispatcher: Send + Sync {
    fn push(&self, record: LogRecord, sink_manager: &Arc<SinkManager>) -> bool;
    fn stop(&self);
    fn join(&self);
    fn is_running(&self) -> bool;
    fn capacity(&self) -> usize;
    fn metrics(&self) -> &Arc<LoggerMetrics>;
    fn policy_name(&self) -> &'static str;
}

struct Shared<P> {
    queue: RingBuffer<AsyncOp, P>,
    running: AtomicBool,
    /// Producers between their `running` check and the end of their push
    in_flight: AtomicUsize,
    has_work: AtomicBool,
    wake_lock: Mutex<()>,
    wake: Condvar,
    metrics: Arc<LoggerMetrics>,
}

impl<P: AdmissionPolicy> Shared<P> {
    fn run(&self) {
        let Some(mut consumer) = self.queue.consumer() else {
            eprintln!("[LOGGER CRITICAL] Worker queue already has a consumer; worker exiting");
            return;
        };

        while self.running.load(Ordering::Acquire) {
            if let Some(op) = consumer.pop() {
                self.dispatch(op);
                continue;
            }

            // Clear the flag, then look again: a producer that committed before
            // seeing the cleared flag did not notify.
            self.has_work.swap(false, Ordering::AcqRel);
            if let Some(op) = consumer.pop() {
                self.dispatch(op);
                continue;
            }

            let mut guard = self.wake_lock.lock();
            while !self.has_work.load(Ordering::Acquire) && self.running.load(Ordering::Acquire) {
                self.wake.wait(&mut guard);
            }
            drop(guard);
            self.metrics.record_wakeup();
        }

        // A producer that saw `running` before stop may still be committing,
        // possibly blocked on a full ring; keep draining until it is done.
        loop {
            while let Some(op) = consumer.pop() {
                self.dispatch(op);
            }
            if self.in_flight.load(Ordering::SeqCst) == 0 {
                break;
            }
            thread::yield_now();
        }
        while let Some(op) = consumer.pop() {
            self.dispatch(op);
        }
    }

    fn dispatch(&self, op: AsyncOp) {
        if let Err(panic_info) = catch_unwind(AssertUnwindSafe(|| op.execute())) {
            self.metrics.record_sink_panic();
            eprintln!(
                "[LOGGER CRITICAL] Dispatch panicked on worker thread: {}. \
                 Worker continues.",
                panic_message(panic_info.as_ref())
            );
        }
        self.metrics.record_dispatched();
    }

    fn notify(&self) {
        let _guard = self.wake_lock.lock();
        self.wake.notify_one();
    }
}

/// Owns the ring buffer and the thread that drains it
///
/// `P` fixes the admission policy at compile time; see
/// [`spawn_dispatcher`] for choosing it from an [`OverflowStrategy`].
pub struct Worker<P: AdmissionPolicy = BlockOnFull> {
    shared: Arc<Shared<P>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<P: AdmissionPolicy> Worker<P> {
    /// Build the ring and start the worker thread
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_metrics(capacity, Arc::new(LoggerMetrics::new()))
    }

    pub fn with_metrics(capacity: usize, metrics: Arc<LoggerMetrics>) -> Result<Self> {
        let shared = Arc::new(Shared {
            queue: RingBuffer::new(capacity)?,
            running: AtomicBool::new(true),
            in_flight: AtomicUsize::new(0),
            has_work: AtomicBool::new(false),
            wake_lock: Mutex::new(()),
            wake: Condvar::new(),
            metrics,
        });

        let thread_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || thread_shared.run())
            .map_err(|e| LoggerError::io_operation("spawning worker thread", WORKER_THREAD_NAME, e))?;

        Ok(Self {
            shared,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Enqueue a record for `sink_manager`
    ///
    /// Returns `false` if the policy rejected it or the worker is stopped.
    pub fn push(&self, record: LogRecord, sink_manager: &Arc<SinkManager>) -> bool {
        let shared = &*self.shared;

        shared.in_flight.fetch_add(1, Ordering::SeqCst);
        let accepted = shared.running.load(Ordering::SeqCst)
            && shared.queue.push(AsyncOp::new(record, Arc::clone(sink_manager)));
        shared.in_flight.fetch_sub(1, Ordering::SeqCst);

        if !accepted {
            shared.metrics.record_rejected();
            return false;
        }
        shared.metrics.record_accepted();

        if !shared.has_work.swap(true, Ordering::AcqRel) {
            shared.notify();
        }
        true
    }

    /// Request shutdown; the thread drains committed records, then exits
    ///
    /// Non-blocking and idempotent.
    pub fn stop(&self) {
        let shared = &*self.shared;
        if shared.running.swap(false, Ordering::SeqCst) {
            shared.has_work.store(true, Ordering::Release);
            let _guard = shared.wake_lock.lock();
            shared.wake.notify_all();
        }
    }

    /// Block until the worker thread exits
    ///
    /// Idempotent. Call [`stop`](Self::stop) first or this waits forever.
    pub fn join(&self) {
        let mut handle = self.handle.lock();
        let Some(h) = handle.take() else {
            return;
        };

        if h.thread().id() == thread::current().id() {
            eprintln!("[LOGGER WARNING] Worker join requested from the worker thread; skipping");
            return;
        }

        if let Err(e) = h.join() {
            eprintln!("[LOGGER ERROR] Worker thread panicked: {:?}", e);
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.shared.queue.capacity()
    }

    /// Approximate number of queued records
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn metrics(&self) -> &Arc<LoggerMetrics> {
        &self.shared.metrics
    }
}

impl<P: AdmissionPolicy> AsyncDispatcher for Worker<P> {
    fn push(&self, record: LogRecord, sink_manager: &Arc<SinkManager>) -> bool {
        Worker::push(self, record, sink_manager)
    }

    fn stop(&self) {
        Worker::stop(self);
    }

    fn join(&self) {
        Worker::join(self);
    }

    fn is_running(&self) -> bool {
        Worker::is_running(self)
    }

    fn capacity(&self) -> usize {
        Worker::capacity(self)
    }

    fn metrics(&self) -> &Arc<LoggerMetrics> {
        Worker::metrics(self)
    }

    fn policy_name(&self) -> &'static str {
        P::NAME
    }
}

impl<P: AdmissionPolicy> Drop for Worker<P> {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}

impl<P: AdmissionPolicy> std::fmt::Debug for Worker<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("queue", &self.shared.queue)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Start a worker whose policy is chosen by `strategy`
pub fn spawn_dispatcher(
    capacity: usize,
    strategy: OverflowStrategy,
) -> Result<Arc<dyn AsyncDispatcher>> {
    Ok(match strategy {
        OverflowStrategy::Block => Arc::new(Worker::<BlockOnFull>::new(capacity)?),
        OverflowStrategy::Discard => Arc::new(Worker::<DiscardOnFull>::new(capacity)?),
    })
}
