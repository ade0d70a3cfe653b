//! Rotating file example
//!
//! Demonstrates the two rotation policies: one file per run, and files that
//! rotate every two seconds. The second logger is assembled from a JSON
//! configuration that environment variables may override.
//!
//! Run with: cargo run --example rotating_file
//! Override with: LOG_PIPELINE_ROTATION_POLICY=startup cargo run --example rotating_file

use rust_log_pipeline::prelude::*;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Log Pipeline - Rotating File Example ===\n");

    println!("1. One file per run:");
    let policy = StartupRotationPolicy::new("Startup {TIMESTAMP}-{ID}.log", TimestampFormat::Date)?;
    let startup = RotatingFileConsumer::new("logs/startup", policy)?;
    let logger = Logger::synchronous(Pipeline::new(Producer::standard(), startup));
    logger.info("Application started");
    logger.warn("Using default settings for some options");
    logger.info("Application initialization complete");
    logger.shutdown();
    println!("   Run again to get the next {{ID}} in logs/startup");

    println!("\n2. Files rotating every two seconds, configured from JSON:");
    let mut config = LoggerConfig::from_json_str(
        r#"{
            "min_level": "Debug",
            "dispatch": { "mode": "asynchronous" },
            "console": { "enabled": true, "colors": true },
            "rotation": {
                "folder": "logs/temporal",
                "policy": "temporal",
                "step_width": 2,
                "step_field": "second"
            }
        }"#,
    )?;
    config.apply_env()?;
    let logger = config.into_logger()?;

    for i in 1..=10 {
        logger.debug(format!("Processing item {}/10", i));
        thread::sleep(Duration::from_millis(500));
    }
    logger.info("All operations completed");
    logger.shutdown();

    println!("\n=== Example completed successfully! ===");
    println!("Check 'logs/temporal' for one file per two-second window");

    Ok(())
}
