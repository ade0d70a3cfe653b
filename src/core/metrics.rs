//! Logger metrics for observability
//!
//! Counters describing what happened to entries after they were accepted:
//! deliveries, contained failures and entries refused after shutdown.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_log_pipeline::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_logged();
/// metrics.record_delivered();
/// metrics.record_consumer_failure();
///
/// assert_eq!(metrics.total_logged(), 1);
/// assert_eq!(metrics.failure_rate(), 50.0);
/// ```
#[derive(Debug, Default)]
pub struct LoggerMetrics {
    /// Entries accepted by the logger
    total_logged: AtomicU64,

    /// Successful consumer deliveries
    delivered: AtomicU64,

    /// Consumer calls that returned an error or panicked
    consumer_failures: AtomicU64,

    /// Formatter steps that returned an error or panicked
    formatter_failures: AtomicU64,

    /// Lazy messages whose evaluation failed
    evaluation_failures: AtomicU64,

    /// Entries refused because the logger was shut down
    rejected: AtomicU64,

    /// Batches processed by the async worker
    batches: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            total_logged: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            consumer_failures: AtomicU64::new(0),
            formatter_failures: AtomicU64::new(0),
            evaluation_failures: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            batches: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn consumer_failures(&self) -> u64 {
        self.consumer_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn formatter_failures(&self) -> u64 {
        self.formatter_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn evaluation_failures(&self) -> u64 {
        self.evaluation_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_logged(&self) {
        self.total_logged.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_consumer_failure(&self) {
        self.consumer_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_formatter_failure(&self) {
        self.formatter_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_evaluation_failure(&self) {
        self.evaluation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the previous count
    #[inline]
    pub fn record_rejected(&self) -> u64 {
        self.rejected.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_batch(&self) {
        self.batches.fetch_add(1, Ordering::Relaxed);
    }

    /// Percentage of consumer calls that failed
    pub fn failure_rate(&self) -> f64 {
        let failures = self.consumer_failures();
        let attempts = self.delivered() + failures;
        if attempts == 0 {
            0.0
        } else {
            (failures as f64 / attempts as f64) * 100.0
        }
    }
}
