//! Formatter steps and filters used by a [`Producer`](super::producer::Producer)

use super::diagnostic::error_chain;
use super::error::Result;
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;

/// Renders one piece of an entry.
///
/// `Ok(None)` vetoes rendering of the entry for the whole pipeline.
/// A [`LoggerError::Evaluation`](super::error::LoggerError::Evaluation) error
/// means the message body itself failed and is handled by the logger.
pub trait Formatter: Send + Sync {
    fn format(&self, entry: &LogEntry) -> Result<Option<String>>;

    fn name(&self) -> &str;
}

/// Decides whether a producer should render an entry at all
pub trait Filter: Send + Sync {
    fn reject(&self, entry: &LogEntry) -> bool;
}

/// Renders the entry's timestamp
#[derive(Debug, Clone, Default)]
pub struct TimestampFormatter {
    format: TimestampFormat,
}

impl TimestampFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: TimestampFormat) -> Self {
        Self { format }
    }
}

impl Formatter for TimestampFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Option<String>> {
        self.format.try_format(&entry.timestamp()).map(Some)
    }

    fn name(&self) -> &str {
        "TimestampFormatter"
    }
}

/// Renders the level marker, optionally padded to a fixed width
#[derive(Debug, Clone, Default)]
pub struct LevelFormatter {
    width: usize,
}

impl LevelFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pad markers to `width` characters, e.g. `INFO ` for width 5
    pub fn padded(width: usize) -> Self {
        Self { width }
    }
}

impl Formatter for LevelFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Option<String>> {
        Ok(Some(format!(
            "{:width$}",
            entry.level().marker(),
            width = self.width
        )))
    }

    fn name(&self) -> &str {
        "LevelFormatter"
    }
}

/// Renders the message, followed by the cause's error chain on the next
/// lines when the entry carries one
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFormatter;

impl MessageFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for MessageFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Option<String>> {
        let mut out = entry.message()?.to_string();
        if let Some(cause) = entry.cause() {
            out.push('\n');
            out.push_str(&error_chain(&**cause));
        }
        Ok(Some(out))
    }

    fn name(&self) -> &str {
        "MessageFormatter"
    }
}

/// Renders the emitting thread's name, or its id for unnamed threads
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadFormatter;

impl Formatter for ThreadFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Option<String>> {
        Ok(Some(
            entry
                .thread_name()
                .unwrap_or_else(|| entry.thread_id())
                .to_string(),
        ))
    }

    fn name(&self) -> &str {
        "ThreadFormatter"
    }
}

/// Rejects standard levels below a threshold; reserved levels always pass
#[derive(Debug, Clone, Copy)]
pub struct LevelFilter {
    min_level: LogLevel,
}

impl LevelFilter {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Filter for LevelFilter {
    fn reject(&self, entry: &LogEntry) -> bool {
        !entry.level().is_reserved() && entry.level() < self.min_level
    }
}

/// Rejects every entry; mutes a pipeline without removing it
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAllFilter;

impl Filter for RejectAllFilter {
    fn reject(&self, _entry: &LogEntry) -> bool {
        true
    }
}
