//! Timestamp formatting utilities
//!
//! Provides standardized, configurable timestamp formats for rendered entries
//! and for rotation file names.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Standardized timestamp format options
///
/// # Examples
///
/// ```
/// use rust_log_pipeline::core::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let instant = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::FileSafe.format(&instant), "2025-01-08_10-30-45");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 format: `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Calendar date only: `2025-01-08`
    Date,

    /// Date and time without characters that are invalid in file names:
    /// `2025-01-08_10-30-45`
    FileSafe,

    /// Custom strftime format
    ///
    /// ```
    /// use rust_log_pipeline::core::TimestampFormat;
    ///
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// assert!(format.validate().is_ok());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    /// Format a `DateTime<Utc>` according to this format.
    ///
    /// An invalid custom pattern renders as the pattern itself; use
    /// [`try_format`](Self::try_format) to detect that case.
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        self.try_format(datetime).unwrap_or_else(|_| match self {
            TimestampFormat::Custom(pattern) => pattern.clone(),
            _ => datetime.to_rfc3339(),
        })
    }

    pub fn try_format(&self, datetime: &DateTime<Utc>) -> Result<String> {
        let pattern = match self {
            TimestampFormat::Iso8601 => "%Y-%m-%dT%H:%M:%S%.3fZ",
            TimestampFormat::Iso8601Micros => "%Y-%m-%dT%H:%M:%S%.6fZ",
            TimestampFormat::Rfc3339 => return Ok(datetime.to_rfc3339()),
            TimestampFormat::UnixMillis => return Ok(datetime.timestamp_millis().to_string()),
            TimestampFormat::Date => "%Y-%m-%d",
            TimestampFormat::FileSafe => "%Y-%m-%d_%H-%M-%S",
            TimestampFormat::Custom(pattern) => pattern,
        };

        let mut out = String::new();
        write!(out, "{}", datetime.format(pattern)).map_err(|_| {
            LoggerError::formatter(
                "TimestampFormat",
                format!("Invalid strftime pattern '{}'", pattern),
            )
        })?;
        Ok(out)
    }

    /// Check that a custom pattern only uses known strftime specifiers
    pub fn validate(&self) -> Result<()> {
        if let TimestampFormat::Custom(pattern) = self {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(LoggerError::config(
                    "TimestampFormat",
                    format!("Invalid strftime pattern '{}'", pattern),
                ));
            }
        }
        Ok(())
    }
}
