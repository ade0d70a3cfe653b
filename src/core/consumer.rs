//! Consumer trait for rendered log output

use super::diagnostic::PipelineError;
use super::error::Result;
use super::log_entry::LogEntry;
use std::panic::{self, AssertUnwindSafe};

/// A sink for rendered entries.
///
/// Consumers are shared between the logger and its worker thread, so they
/// take `&self` and guard their own mutable state.
pub trait Consumer: Send + Sync {
    fn consume(&self, entry: &LogEntry, formatted: &str) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

/// Deliver one rendered entry inside a failure boundary.
///
/// Errors and panics are reported on stderr and never propagate, so one
/// consumer cannot keep its siblings from receiving the entry.
/// Returns whether the delivery succeeded.
pub fn accept(consumer: &dyn Consumer, entry: &LogEntry, formatted: &str) -> bool {
    let result = panic::catch_unwind(AssertUnwindSafe(|| consumer.consume(entry, formatted)));
    let error = PipelineError::new("Consumer", consumer.name());
    match result {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            error.print_error(&e);
            false
        }
        Err(payload) => {
            error.print_panic(payload.as_ref());
            false
        }
    }
}

/// Flush a consumer inside the same kind of failure boundary
pub fn flush(consumer: &dyn Consumer) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| consumer.flush())) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            eprintln!("[LOGGER ERROR] Consumer '{}' flush failed: {}", consumer.name(), e);
            false
        }
        Err(payload) => {
            eprintln!(
                "[LOGGER CRITICAL] Consumer '{}' panicked during flush: {}",
                consumer.name(),
                super::diagnostic::panic_message(payload.as_ref())
            );
            false
        }
    }
}
