//! Stress tests for concurrent dispatch
//!
//! These tests verify:
//! - Lazy messages are evaluated exactly once under concurrent rendering
//! - The async worker preserves per-thread order and enqueue order
//! - Shutdown drains every accepted entry
//! - Concurrent writes to a rotating file never interleave within a line

use rust_log_pipeline::consumers::{BufferConsumer, RotatingFileConsumer, StartupRotationPolicy};
use rust_log_pipeline::core::{
    AtomicLazy, BoxError, LogEntry, LogLevel, Logger, MessageFormatter, Pipeline, Producer,
    TimestampFormat,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 8;
const PER_THREAD: usize = 500;

fn message_logger(buffer: &BufferConsumer, capacity: Option<usize>) -> Logger {
    Logger::builder()
        .pipeline(Pipeline::new(
            Producer::new().formatter(MessageFormatter),
            buffer.clone(),
        ))
        .asynchronous(capacity)
        .build()
        .expect("Failed to build logger")
}

/// Every thread sees the same value and the initializer runs once
#[test]
fn test_lazy_cell_exactly_once_under_contention() {
    for _ in 0..20 {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cell = Arc::new(AtomicLazy::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::yield_now();
            Ok::<_, BoxError>(String::from("resolved"))
        }));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cell.get().map(|value| value.clone()).ok()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().as_deref(), Some("resolved"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

/// A shared entry rendered from many threads evaluates its message once
#[test]
fn test_shared_entry_renders_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let entry = Arc::new(LogEntry::lazy(LogLevel::Info, move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<_, BoxError>("shared")
    }));
    let producer = Arc::new(Producer::standard());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let entry = Arc::clone(&entry);
            let producer = Arc::clone(&producer);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                producer.render(&entry).text().map(str::to_string)
            })
        })
        .collect();

    for handle in handles {
        let rendered = handle.join().unwrap().expect("rendered");
        assert!(rendered.ends_with("] shared"));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Entries from each thread arrive in the order that thread logged them
#[test]
fn test_async_preserves_per_thread_order() {
    for capacity in [None, Some(16)] {
        let buffer = BufferConsumer::new();
        let logger = Arc::new(message_logger(&buffer, capacity));

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let logger = Arc::clone(&logger);
                thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        logger.info(format!("{}:{}", t, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        logger.shutdown();

        let lines = buffer.drain();
        assert_eq!(lines.len(), THREADS * PER_THREAD);

        let mut next_expected: HashMap<usize, usize> = HashMap::new();
        for line in &lines {
            let (thread_id, index) = line.split_once(':').expect("thread:index");
            let thread_id: usize = thread_id.parse().unwrap();
            let index: usize = index.parse().unwrap();
            let expected = next_expected.entry(thread_id).or_insert(0);
            assert_eq!(index, *expected, "thread {} out of order", thread_id);
            *expected += 1;
        }
        assert_eq!(logger.metrics().total_logged(), (THREADS * PER_THREAD) as u64);
        assert!(logger.metrics().batches() >= 1);
    }
}

/// Single producer: delivery order equals logging order exactly
#[test]
fn test_async_fifo_single_thread() {
    let buffer = BufferConsumer::new();
    let logger = message_logger(&buffer, Some(4));

    for i in 0..2_000 {
        logger.info(i.to_string());
    }
    logger.flush();

    let expected: Vec<String> = (0..2_000).map(|i| i.to_string()).collect();
    assert_eq!(buffer.drain(), expected);
}

/// Shutdown while other threads are still logging: nothing accepted is lost
#[test]
fn test_shutdown_drains_accepted_entries() {
    let buffer = BufferConsumer::new();
    let logger = Arc::new(message_logger(&buffer, Some(8)));
    let start = Arc::new(Barrier::new(THREADS + 1));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                for i in 0..PER_THREAD {
                    logger.info(format!("{}:{}", t, i));
                }
            })
        })
        .collect();

    start.wait();
    thread::sleep(std::time::Duration::from_millis(5));
    logger.shutdown();
    for handle in handles {
        handle.join().unwrap();
    }

    let metrics = logger.metrics();
    let delivered = buffer.drain().len() as u64;
    assert_eq!(delivered, metrics.total_logged());
    assert_eq!(
        metrics.total_logged() + metrics.rejected(),
        (THREADS * PER_THREAD) as u64
    );
}

/// The rotation decision and the write share one lock
#[test]
fn test_concurrent_rotating_writes_stay_whole() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let policy = StartupRotationPolicy::new("stress-{ID}.log", TimestampFormat::Date).unwrap();
    let consumer = Arc::new(RotatingFileConsumer::new(temp_dir.path(), policy).unwrap());
    let logger = Arc::new(Logger::synchronous(
        Pipeline::builder()
            .producer(Producer::new().formatter(MessageFormatter))
            .shared_consumer(consumer.clone())
            .build()
            .unwrap(),
    ));

    let payload = "x".repeat(256);
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            let payload = payload.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    logger.info(format!("{}-{}-{}", t, i, payload));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.shutdown();

    let path = consumer.current_path().expect("file opened");
    let content = std::fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), THREADS * 100);
    assert!(lines.iter().all(|line| line.ends_with(&payload)));
}
