//! Async logging example
//!
//! Demonstrates a logger whose pipelines run on a background worker, fed by
//! several threads at once.
//!
//! Run with: cargo run --example async_logging

use rust_log_pipeline::prelude::*;
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    println!("=== Rust Log Pipeline - Async Logging Example ===\n");

    let logger = Logger::builder()
        .pipeline(Pipeline::new(Producer::standard(), ConsoleConsumer::new()))
        .pipeline(Pipeline::new(
            Producer::standard(),
            FileConsumer::new("async_test.log")?,
        ))
        .asynchronous(Some(1000))
        .build()?;

    println!("1. High-throughput async logging:");
    for i in 0..100 {
        logger.info(format!("Message #{}", i));
    }
    logger.flush();
    println!("   Logged 100 messages asynchronously");

    println!("\n2. Multi-threaded logging:");
    let logger = Arc::new(logger);
    let handles: Vec<_> = (0..5)
        .map(|thread_id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..20 {
                    logger.info(format!("Thread {} - Message {}", thread_id, i));
                }
            })
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            eprintln!("a logging thread panicked");
        }
    }

    // Drains everything already queued before returning
    logger.shutdown();
    println!("   5 threads logged 20 messages each");

    let metrics = logger.metrics();
    println!(
        "\n   logged: {}, delivered: {}, batches: {}",
        metrics.total_logged(),
        metrics.delivered(),
        metrics.batches()
    );

    println!("\n=== Example completed successfully! ===");
    println!("Check 'async_test.log' for file output");

    Ok(())
}
