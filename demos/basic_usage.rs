//! Basic logger usage example
//!
//! Demonstrates synchronous logging through a console pipeline, lazy and
//! parameterized messages, and the minimum level gate.
//!
//! Run with: cargo run --example basic_usage

use rust_log_pipeline::prelude::*;
use std::io;

fn main() -> Result<()> {
    println!("=== Rust Log Pipeline - Basic Usage Example ===\n");

    let pipeline = Pipeline::builder()
        .producer(Producer::standard())
        .consumer(ConsoleConsumer::new())
        .build()?;
    let logger = Logger::synchronous(pipeline);

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.fatal("This is a fatal message");

    println!("\n2. Lazy and parameterized messages:");
    logger.log_lazy(LogLevel::Info, || {
        Ok::<_, BoxError>(format!("computed only when rendered: {}", 6 * 7))
    });
    logger.log_parameterized(
        LogLevel::Warn,
        ParameterizedMessage::new("{} of {} disks are full").arg(2).arg(5),
    );

    println!("\n3. Failures are reported, not raised:");
    logger.log_lazy(LogLevel::Warn, || {
        Err::<String, _>(io::Error::new(io::ErrorKind::NotFound, "sensor offline"))
    });
    logger.throwable(
        LogLevel::Error,
        io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume"),
        "Could not save settings",
    );

    println!("\n4. Minimum level set to INFO - trace and debug won't show:");
    logger.set_min_level(LogLevel::Info);
    logger.trace("Trace message (hidden)");
    logger.debug("Debug message (hidden)");
    logger.info("Info message (visible)");

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
