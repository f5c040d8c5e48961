//! File logging example
//!
//! Demonstrates logging to a console sink and a file sink at different
//! levels, configured from JSON.
//!
//! Run with: cargo run --example file_logging

use ringlog::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== ringlog - File Logging Example ===\n");

    let config = RegistryConfig::from_json_str(
        r#"{
            "level": "Debug",
            "pattern": "[%Y-%m-%d %H:%M:%S.%e] [%l] %v\n",
            "async_mode": { "queue_capacity": 4096, "overflow": "block" }
        }"#,
    )?;
    let registry = Registry::from_config(config)?;
    let logger = registry.create_logger("app")?;

    // Console only shows warnings and above; the file gets everything
    logger.add_sink(Arc::new(
        ConsoleSink::stdout("console").with_level(LogLevel::Warn),
    ));
    logger.try_add_sink(Arc::new(FileSink::new("file", "application.log")?))?;

    println!("1. Logging to both console and file:");
    logger.info("Application started");
    logger.debug("Loading configuration...");
    logger.info("Configuration loaded successfully");
    logger.warn("Using default settings for some options");
    logger.info("Connecting to database...");
    logger.info("Database connection established");
    logger.error("Failed to load optional plugin");
    logger.info("Application initialization complete");

    println!("\n2. Performing some operations:");
    for i in 1..=5 {
        logger.info(format!("Processing item {}/5", i));
        if i == 3 {
            logger.warn("Item 3 took longer than expected");
        }
    }
    logger.info("All operations completed");

    registry.shutdown();

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' for the full log output");

    Ok(())
}
