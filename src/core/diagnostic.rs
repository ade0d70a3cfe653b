//! Self-diagnostics for failures inside the pipeline
//!
//! Nothing that happens after a logger is built may reach application code,
//! so formatter and consumer failures end up here and are printed to stderr.

use std::any::Any;
use std::error::Error;
use std::fmt::Write;

/// Render an error and its chain of sources, one `Caused by:` line per source.
///
/// This is the text appended to entries that carry a cause.
pub fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(out, "\nCaused by: {}", cause);
        source = cause.source();
    }
    out
}

/// Extract a readable message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// A failure of one pipeline component while handling an entry
#[derive(Debug, Clone, Copy)]
pub struct PipelineError<'a> {
    /// Kind of component, e.g. `Formatter` or `Consumer`
    pub component: &'static str,
    /// Name of the failing instance
    pub identity: &'a str,
}

impl<'a> PipelineError<'a> {
    pub fn new(component: &'static str, identity: &'a str) -> Self {
        Self {
            component,
            identity,
        }
    }

    pub fn describe(&self, detail: &str) -> String {
        format!(
            "[LOGGER ERROR] Could not pass log entry through {} '{}' of pipeline:\n{}",
            self.component, self.identity, detail
        )
    }

    /// Report a returned error
    pub fn print_error(&self, error: &(dyn Error + 'static)) {
        eprintln!("{}", self.describe(&error_chain(error)));
    }

    /// Report a panic caught at the component boundary
    pub fn print_panic(&self, payload: &(dyn Any + Send)) {
        eprintln!(
            "{}",
            self.describe(&format!("panicked: {}", panic_message(payload)))
        );
    }
}
