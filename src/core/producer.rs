//! Producer: the ordered formatter chain of a pipeline

use super::diagnostic::PipelineError;
use super::error::{Cause, LoggerError};
use super::formatter::{Filter, Formatter, LevelFormatter, MessageFormatter, TimestampFormatter};
use super::log_entry::LogEntry;
use std::panic::{self, AssertUnwindSafe};

/// One element of the formatter chain
pub enum Step {
    Text(String),
    Formatter(Box<dyn Formatter>),
}

/// Outcome of rendering one entry on one pipeline
#[derive(Debug, Clone)]
pub enum Rendered {
    Text(String),
    /// Filtered out or vetoed by a formatter
    Skipped,
    /// A formatter failed; the failure was already reported
    Failed,
    /// The entry's lazy message failed; the logger reports this once per entry
    EvaluationFailed(Cause),
}

impl Rendered {
    pub fn text(&self) -> Option<&str> {
        match self {
            Rendered::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Renders entries by concatenating the output of its steps in order.
///
/// # Example
///
/// ```
/// use rust_log_pipeline::core::{LogEntry, LogLevel, MessageFormatter, LevelFormatter, Producer};
///
/// let producer = Producer::new()
///     .formatter(LevelFormatter::new())
///     .text(": ")
///     .formatter(MessageFormatter);
///
/// let rendered = producer.render(&LogEntry::new(LogLevel::Warn, "low disk"));
/// assert_eq!(rendered.text(), Some("WARN: low disk"));
/// ```
#[derive(Default)]
pub struct Producer {
    steps: Vec<Step>,
    filters: Vec<Box<dyn Filter>>,
}

impl Producer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `[<timestamp> <LEVEL>] <message>`
    pub fn standard() -> Self {
        Self::new()
            .text("[")
            .formatter(TimestampFormatter::new())
            .text(" ")
            .formatter(LevelFormatter::new())
            .text("] ")
            .formatter(MessageFormatter)
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.steps.push(Step::Text(text.into()));
        self
    }

    #[must_use]
    pub fn formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.steps.push(Step::Formatter(Box::new(formatter)));
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Render an entry. Never panics and never returns an error: formatter
    /// failures are reported on stderr and nothing is rendered.
    pub fn render(&self, entry: &LogEntry) -> Rendered {
        let rejected =
            panic::catch_unwind(AssertUnwindSafe(|| self.filters.iter().any(|f| f.reject(entry))));
        match rejected {
            Ok(false) => {}
            Ok(true) => return Rendered::Skipped,
            Err(payload) => {
                PipelineError::new("Filter", "filter").print_panic(payload.as_ref());
                return Rendered::Failed;
            }
        }

        let mut out = String::new();
        for step in &self.steps {
            match step {
                Step::Text(text) => out.push_str(text),
                Step::Formatter(formatter) => match Self::apply(formatter.as_ref(), entry) {
                    Ok(Some(text)) => out.push_str(&text),
                    Ok(None) => return Rendered::Skipped,
                    Err(rendered) => return rendered,
                },
            }
        }
        Rendered::Text(out)
    }

    fn apply(
        formatter: &dyn Formatter,
        entry: &LogEntry,
    ) -> std::result::Result<Option<String>, Rendered> {
        let error = PipelineError::new("Formatter", formatter.name());
        match panic::catch_unwind(AssertUnwindSafe(|| formatter.format(entry))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(LoggerError::Evaluation { cause, .. })) => {
                Err(Rendered::EvaluationFailed(cause))
            }
            Ok(Err(e)) => {
                error.print_error(&e);
                Err(Rendered::Failed)
            }
            Err(payload) => {
                error.print_panic(payload.as_ref());
                Err(Rendered::Failed)
            }
        }
    }
}
