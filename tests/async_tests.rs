//! End-to-end tests of the async path: registry, shared worker, sinks
//!
//! These tests verify:
//! - Records reach sinks on the worker thread, in order
//! - Loggers sharing a worker never cross-talk
//! - Shutdown drains everything already queued
//! - A panicking sink does not take the worker down

mod common;

use common::{PanickingSink, VectorSink};
use ringlog::prelude::*;
use ringlog::{info, log_deferred, BlockOnFull, SinkManager, Worker, WORKER_THREAD_NAME};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn async_registry(capacity: usize, overflow: OverflowStrategy) -> Registry {
    Registry::from_config(RegistryConfig {
        async_mode: Some(AsyncConfig {
            queue_capacity: capacity,
            overflow,
        }),
        ..RegistryConfig::default()
    })
    .unwrap()
}

#[test]
fn test_basic_flow() {
    let registry = async_registry(1024, OverflowStrategy::Block);
    let logger = registry.create_logger("async_a").unwrap();
    let sink = VectorSink::new("sink_a");
    logger.add_sink(sink.clone());

    logger.info("Test Message 1");

    assert!(sink.wait_for(1));
    assert_eq!(sink.messages()[0], "Test Message 1");
    assert_eq!(sink.writer_threads()[0].as_deref(), Some(WORKER_THREAD_NAME));
}

#[test]
fn test_ordering() {
    let registry = async_registry(1024, OverflowStrategy::Block);
    let logger = registry.create_logger("async_a").unwrap();
    let sink = VectorSink::new("sink_a");
    logger.add_sink(sink.clone());

    for i in 0..100 {
        logger.info(format!("msg {}", i));
    }

    assert!(sink.wait_for(100));
    let expected: Vec<String> = (0..100).map(|i| format!("msg {}", i)).collect();
    assert_eq!(sink.messages(), expected);
}

#[test]
fn test_routing() {
    let registry = async_registry(1024, OverflowStrategy::Block);
    let logger_a = registry.create_logger("async_a").unwrap();
    let logger_b = registry.create_logger("async_b").unwrap();
    let sink_a = VectorSink::new("sink_a");
    let sink_b = VectorSink::new("sink_b");
    logger_a.add_sink(sink_a.clone());
    logger_b.add_sink(sink_b.clone());

    logger_a.info("Hello A");
    logger_b.info("Hello B");

    assert!(sink_a.wait_for(1));
    assert!(sink_b.wait_for(1));
    registry.shutdown();

    assert_eq!(sink_a.messages(), vec!["Hello A"]);
    assert_eq!(sink_b.messages(), vec!["Hello B"]);
}

#[test]
fn test_concurrency() {
    const NUM_THREADS: usize = 4;
    const LOGS_PER_THREAD: usize = 100;

    let registry = async_registry(1024, OverflowStrategy::Block);
    let logger = registry.create_logger("async_a").unwrap();
    let sink = VectorSink::new("sink_a");
    logger.add_sink(sink.clone());

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for j in 0..LOGS_PER_THREAD {
                    info!(logger, "Thread {} Msg {}", t, j);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(sink.wait_for(NUM_THREADS * LOGS_PER_THREAD));
    registry.shutdown();
    assert_eq!(sink.len(), NUM_THREADS * LOGS_PER_THREAD);

    // Per-thread order survives interleaving
    for t in 0..NUM_THREADS {
        let prefix = format!("Thread {} Msg ", t);
        let seen: Vec<usize> = sink
            .messages()
            .iter()
            .filter_map(|m| m.strip_prefix(&prefix).and_then(|n| n.parse().ok()))
            .collect();
        assert_eq!(seen, (0..LOGS_PER_THREAD).collect::<Vec<_>>());
    }
}

#[test]
fn test_shutdown_drains_queue() {
    let registry = async_registry(8192, OverflowStrategy::Block);
    let logger = registry.create_logger("drain").unwrap();
    let sink = VectorSink::new("sink");
    logger.add_sink(sink.clone());

    for i in 0..5_000 {
        logger.info(format!("{}", i));
    }
    registry.shutdown();

    assert_eq!(sink.len(), 5_000);
    assert_eq!(registry.worker_metrics().unwrap().dispatched_count(), 5_000);
}

#[test]
fn test_drop_registry_drains_queue() {
    let sink = VectorSink::new("sink");
    {
        let registry = async_registry(1024, OverflowStrategy::Block);
        let logger = registry.create_logger("drop").unwrap();
        logger.add_sink(sink.clone());
        for i in 0..300 {
            logger.debug(format!("{}", i));
        }
    }
    assert_eq!(sink.len(), 300);
}

#[test]
fn test_idle_worker_wakes() {
    let registry = async_registry(64, OverflowStrategy::Block);
    let logger = registry.create_logger("idle").unwrap();
    let sink = VectorSink::new("sink");
    logger.add_sink(sink.clone());

    for round in 0..5 {
        thread::sleep(Duration::from_millis(30));
        logger.info(format!("after idle {}", round));
        assert!(sink.wait_for(round + 1));
    }
    assert!(registry.worker_metrics().unwrap().wakeup_count() >= 1);
}

#[test]
fn test_idle_worker_does_not_spin() {
    let registry = async_registry(64, OverflowStrategy::Block);
    let logger = registry.create_logger("idle").unwrap();
    let sink = VectorSink::new("sink");
    logger.add_sink(sink.clone());
    let metrics = Arc::clone(registry.worker_metrics().unwrap());

    thread::sleep(Duration::from_millis(50));
    let settled = metrics.wakeup_count();
    thread::sleep(Duration::from_millis(100));
    assert!(
        metrics.wakeup_count() <= settled + 1,
        "idle worker woke {} times",
        metrics.wakeup_count() - settled
    );

    const PUSHES: u64 = 3;
    for round in 0..PUSHES {
        let sent = Instant::now();
        logger.info(format!("after idle {}", round));
        assert!(sink.wait_for(round as usize + 1));
        assert!(
            sent.elapsed() < Duration::from_millis(500),
            "worker took {:?} to resume",
            sent.elapsed()
        );
        thread::sleep(Duration::from_millis(30));
    }

    assert!(metrics.wakeup_count() <= settled + PUSHES + 2);
}

#[test]
fn test_stop_while_producers_block_on_full_ring() {
    for _ in 0..20 {
        let worker = Arc::new(Worker::<BlockOnFull>::new(2).unwrap());
        let sink = VectorSink::slow("slow", Duration::from_micros(200));
        let manager = SinkManager::new();
        manager.add_sink(sink.clone());
        let manager = Arc::new(manager);
        let accepted = Arc::new(AtomicU64::new(0));

        let producers: Vec<_> = (0..4)
            .map(|p| {
                let worker = Arc::clone(&worker);
                let manager = Arc::clone(&manager);
                let accepted = Arc::clone(&accepted);
                thread::spawn(move || {
                    for i in 0..100 {
                        let record = LogRecord::new(LogLevel::Info, format!("{}-{}", p, i));
                        if worker.push(record, &manager) {
                            accepted.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(5));
        worker.stop();
        worker.join();
        for producer in producers {
            producer.join().unwrap();
        }

        let accepted = accepted.load(Ordering::Relaxed);
        assert_eq!(sink.len() as u64, accepted);
        assert_eq!(worker.metrics().dispatched_count(), accepted);
        assert_eq!(
            worker.metrics().accepted_count() + worker.metrics().rejected_count(),
            400
        );
    }
}

#[test]
fn test_panicking_sink_is_isolated() {
    let registry = async_registry(256, OverflowStrategy::Block);
    let logger = registry.create_logger("faulty").unwrap();
    let good = VectorSink::new("good");
    logger.add_sink(Arc::new(PanickingSink));
    logger.add_sink(good.clone());

    logger.error("first");
    logger.error("second");

    assert!(good.wait_for(2));
    registry.shutdown();

    assert_eq!(good.messages(), vec!["first", "second"]);
    assert_eq!(logger.metrics().sink_panic_count(), 2);
}

#[test]
fn test_deferred_renders_on_worker() {
    let registry = async_registry(256, OverflowStrategy::Block);
    let logger = registry.create_logger("deferred").unwrap();
    let sink = VectorSink::new("sink");
    logger.add_sink(sink.clone());

    let rendered_on = Arc::new(parking_lot::Mutex::new(None));
    let slot = Arc::clone(&rendered_on);
    logger.log_deferred(LogLevel::Info, move || {
        *slot.lock() = thread::current().name().map(str::to_string);
        "lazy".to_string()
    });
    let values = vec!["a", "b"];
    log_deferred!(logger, LogLevel::Info, "values={:?}", values);

    assert!(sink.wait_for(2));
    assert_eq!(sink.messages(), vec!["lazy", "values=[\"a\", \"b\"]"]);
    assert_eq!(rendered_on.lock().as_deref(), Some(WORKER_THREAD_NAME));
}

#[test]
fn test_pattern_applied_on_worker() {
    let registry = async_registry(256, OverflowStrategy::Block);
    let logger = registry.create_logger("patterned").unwrap();
    let sink = VectorSink::new("sink");
    logger.add_sink(sink.clone());
    logger.set_pattern("[%n] [%l] %v");

    logger.warn("careful");

    assert!(sink.wait_for(1));
    assert_eq!(sink.lines(), vec!["[patterned] [WARN] careful"]);
}

#[test]
fn test_discard_registry_never_blocks() {
    let registry = async_registry(16, OverflowStrategy::Discard);
    let logger = registry.create_logger("lossy").unwrap();
    let sink = VectorSink::new("sink");
    logger.add_sink(sink.clone());

    for i in 0..10_000 {
        logger.info(format!("{}", i));
    }
    registry.shutdown();

    let metrics = logger.metrics();
    assert_eq!(metrics.accepted_count() + metrics.rejected_count(), 10_000);
    assert_eq!(sink.len() as u64, metrics.accepted_count());

    // Survivors keep their relative order
    let numbers: Vec<u64> = sink.messages().iter().map(|m| m.parse().unwrap()).collect();
    assert!(numbers.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_logging_after_shutdown_is_rejected() {
    let registry = async_registry(64, OverflowStrategy::Block);
    let logger = registry.create_logger("late").unwrap();
    let sink = VectorSink::new("sink");
    logger.add_sink(sink.clone());

    registry.shutdown();
    logger.info("too late");

    thread::sleep(Duration::from_millis(20));
    assert_eq!(sink.len(), 0);
    assert_eq!(logger.metrics().rejected_count(), 1);
}
