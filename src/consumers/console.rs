//! Console consumer implementation

use crate::core::{Consumer, LogEntry, Result};
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::Write;

/// Writes rendered entries to stdout; `Error`, `Fatal` and `Logger` go to stderr
pub struct ConsoleConsumer {
    use_colors: bool,
}

impl ConsoleConsumer {
    pub fn new() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
        }
    }

    /// Colors are only available with the `console` feature
    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors: use_colors && cfg!(feature = "console"),
        }
    }

    pub fn uses_colors(&self) -> bool {
        self.use_colors
    }

    #[cfg(feature = "console")]
    fn decorate(&self, entry: &LogEntry, formatted: &str) -> String {
        if self.use_colors {
            formatted.color(entry.level().color_code()).to_string()
        } else {
            formatted.to_string()
        }
    }

    #[cfg(not(feature = "console"))]
    fn decorate(&self, _entry: &LogEntry, formatted: &str) -> String {
        formatted.to_string()
    }
}

impl Default for ConsoleConsumer {
    fn default() -> Self {
        Self::new()
    }
}

impl Consumer for ConsoleConsumer {
    fn consume(&self, entry: &LogEntry, formatted: &str) -> Result<()> {
        let output = self.decorate(entry, formatted);

        if entry.level().is_severe() {
            writeln!(std::io::stderr().lock(), "{}", output)?;
        } else {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", output)?;
            stdout.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    #[test]
    fn test_plain_output_is_unchanged() {
        let consumer = ConsoleConsumer::with_colors(false);
        assert!(!consumer.uses_colors());
        let entry = LogEntry::new(LogLevel::Info, "x");
        assert_eq!(consumer.decorate(&entry, "[INFO] x"), "[INFO] x");
    }

    #[test]
    fn test_consume_writes_both_streams() {
        let consumer = ConsoleConsumer::new();
        consumer
            .consume(&LogEntry::new(LogLevel::Info, "out"), "console test stdout")
            .unwrap();
        consumer
            .consume(&LogEntry::new(LogLevel::Error, "err"), "console test stderr")
            .unwrap();
        consumer.flush().unwrap();
    }
}
