//! Basic logger usage example
//!
//! Demonstrates synchronous logging with a console sink, level filtering
//! and the formatting macros.
//!
//! Run with: cargo run --example basic_usage

use ringlog::prelude::*;
use ringlog::{debug, info, warn};

fn main() -> Result<()> {
    println!("=== ringlog - Basic Usage Example ===\n");

    // Synchronous logger: records are written on the calling thread
    let logger = Logger::builder("basic")
        .level(LogLevel::Trace)
        .pattern("[%H:%M:%S.%e] [%n] [%l] %v\n")
        .sink(ConsoleSink::stdout("console").with_colors(true))
        .build()?;

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.fatal("This is a fatal message");

    println!("\n2. Logging with different minimum levels:");
    logger.set_level(LogLevel::Info);
    println!("   Minimum level set to INFO - trace and debug won't show:");
    logger.trace("Trace message (hidden)");
    logger.debug("Debug message (hidden)");
    logger.info("Info message (visible)");
    logger.warn("Warning message (visible)");

    println!("\n3. Macros with format arguments and call sites:");
    logger.set_pattern("[%l] %s:%# %v\n");
    let port = 8080;
    info!(logger, "Server listening on port {}", port);
    warn!(logger, "{} of {} workers idle", 3, 8);
    debug!(logger, "Filtered, so this argument is never formatted: {}", port);

    logger.flush()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
