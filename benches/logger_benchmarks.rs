//! Criterion benchmarks for rust_log_pipeline

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_log_pipeline::prelude::*;
use std::sync::Arc;

/// Discards every line so the benchmarks measure dispatch, not I/O
struct NullConsumer;

impl Consumer for NullConsumer {
    fn consume(&self, _entry: &LogEntry, formatted: &str) -> Result<()> {
        black_box(formatted);
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

fn null_pipeline() -> Pipeline {
    Pipeline::new(Producer::standard(), NullConsumer)
}

// ============================================================================
// Logger Creation Benchmarks
// ============================================================================

fn bench_logger_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("logger_creation");
    group.throughput(Throughput::Elements(1));

    group.bench_function("synchronous", |b| {
        b.iter(|| black_box(Logger::synchronous(null_pipeline())));
    });

    group.bench_function("asynchronous", |b| {
        b.iter(|| black_box(Logger::asynchronous(null_pipeline()).unwrap()));
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_sync_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_logging");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::synchronous(null_pipeline());

    group.bench_function("info", |b| {
        b.iter(|| logger.info(black_box("Info message")));
    });

    group.bench_function("error", |b| {
        b.iter(|| logger.error(black_box("Error message")));
    });

    group.bench_function("parameterized", |b| {
        b.iter(|| {
            logger.log_parameterized(
                LogLevel::Info,
                ParameterizedMessage::new("{} of {} done").arg(black_box(3)).arg(10),
            )
        });
    });

    group.finish();
}

fn bench_async_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("async_logging");
    group.throughput(Throughput::Elements(1));

    let unbounded = Logger::asynchronous(null_pipeline()).unwrap();
    group.bench_function("unbounded", |b| {
        b.iter(|| unbounded.info(black_box("Async message")));
    });
    unbounded.flush();

    let bounded = Logger::builder()
        .pipeline(null_pipeline())
        .asynchronous(Some(1024))
        .build()
        .unwrap();
    group.bench_function("bounded_1024", |b| {
        b.iter(|| bounded.info(black_box("Async message")));
    });
    bounded.flush();

    group.finish();
}

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    let logger = Arc::new(Logger::asynchronous(null_pipeline()).unwrap());

    group.bench_function("multi_thread_4", |b| {
        let logger = Arc::clone(&logger);
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let logger = Arc::clone(&logger);
                    std::thread::spawn(move || {
                        logger.info(black_box("Concurrent message"));
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
}

// ============================================================================
// Lazy Evaluation Benchmarks
// ============================================================================

fn bench_lazy_messages(c: &mut Criterion) {
    let mut group = c.benchmark_group("lazy_messages");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder()
        .pipeline(null_pipeline())
        .min_level(LogLevel::Warn)
        .build()
        .unwrap();

    group.bench_function("eager_below_min_level", |b| {
        b.iter(|| logger.debug(format!("expensive {}", black_box(42))));
    });

    group.bench_function("lazy_below_min_level", |b| {
        b.iter(|| {
            logger.log_lazy(LogLevel::Debug, || {
                Ok::<_, BoxError>(format!("expensive {}", black_box(42)))
            })
        });
    });

    group.bench_function("lazy_rendered", |b| {
        b.iter(|| {
            logger.log_lazy(LogLevel::Warn, || {
                Ok::<_, BoxError>(format!("expensive {}", black_box(42)))
            })
        });
    });

    group.finish();
}

// ============================================================================
// Rendering Benchmarks
// ============================================================================

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");
    group.throughput(Throughput::Elements(1));

    let standard = Producer::standard();
    let message_only = Producer::new().formatter(MessageFormatter);
    let entry = LogEntry::new(LogLevel::Info, "Render me");

    group.bench_function("standard", |b| {
        b.iter(|| black_box(standard.render(black_box(&entry))));
    });

    group.bench_function("message_only", |b| {
        b.iter(|| black_box(message_only.render(black_box(&entry))));
    });

    group.bench_function("filtered", |b| {
        let filtered = Producer::standard().filter(LevelFilter::new(LogLevel::Error));
        b.iter(|| black_box(filtered.render(black_box(&entry))));
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_logger_creation,
    bench_sync_logging,
    bench_async_logging,
    bench_concurrent_logging,
    bench_lazy_messages,
    bench_rendering
);

criterion_main!(benches);
