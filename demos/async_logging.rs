//! Async logging example
//!
//! Demonstrates a registry whose loggers share one background worker fed
//! through the ring buffer, with several producer threads.
//!
//! Run with: cargo run --example async_logging

use ringlog::prelude::*;
use ringlog::{info, log_deferred};
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    println!("=== ringlog - Async Logging Example ===\n");

    let config = RegistryConfig {
        pattern: "[%H:%M:%S.%f] [%n] [%t] [%l] %v\n".to_string(),
        async_mode: Some(AsyncConfig {
            queue_capacity: 1024,
            overflow: OverflowStrategy::Block,
        }),
        ..RegistryConfig::default()
    };
    let registry = Registry::from_config(config)?;

    let logger = registry.create_logger("async")?;
    logger.add_sink(Arc::new(ConsoleSink::stderr("console")));

    println!("1. High-performance async logging:");
    for i in 0..100 {
        info!(logger, "Message #{}", i);
    }
    println!("   Queued 100 messages");

    println!("\n2. Deferred formatting on the worker thread:");
    let batch: Vec<u32> = (1..=5).collect();
    log_deferred!(logger, LogLevel::Info, "processed batch {:?}", batch);

    println!("\n3. Multi-threaded logging:");
    let handles: Vec<_> = (0..5)
        .map(|thread_id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..20 {
                    info!(logger, "Thread {} - Message {}", thread_id, i);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("producer thread panicked");
    }
    println!("   5 threads queued 20 messages each");

    // Drains the queue, joins the worker and flushes every sink
    registry.shutdown();

    if let Some(metrics) = registry.worker_metrics() {
        println!(
            "\n   accepted: {}, rejected: {}, dispatched: {}",
            metrics.accepted_count(),
            metrics.rejected_count(),
            metrics.dispatched_count()
        );
    }

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
