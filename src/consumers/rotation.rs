//! Rotation policies: which file a rotating consumer writes to
//!
//! A policy turns a root directory and an entry timestamp into a file path.
//! File names come from a pattern with placeholders:
//!
//! - `{TIMESTAMP}`: a formatted timestamp (both policies)
//! - `{ID}`: the smallest positive integer whose file does not exist yet
//!   (startup policy only)

use crate::core::{LoggerError, Result, TimestampFormat};
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const TIMESTAMP_PLACEHOLDER: &str = "{TIMESTAMP}";
pub const ID_PLACEHOLDER: &str = "{ID}";

/// Decides the current output file of a [`RotatingFileConsumer`](super::RotatingFileConsumer)
pub trait RotationPolicy: Send {
    /// Called once before the first file is opened
    fn initialize(&mut self, root: &Path, timestamp: DateTime<Utc>) -> Result<()>;

    /// Path the entry logged at `timestamp` belongs to
    fn current_file(&self, root: &Path, timestamp: DateTime<Utc>) -> Result<PathBuf>;

    fn name(&self) -> &str;
}

impl<P: RotationPolicy + ?Sized> RotationPolicy for Box<P> {
    fn initialize(&mut self, root: &Path, timestamp: DateTime<Utc>) -> Result<()> {
        (**self).initialize(root, timestamp)
    }

    fn current_file(&self, root: &Path, timestamp: DateTime<Utc>) -> Result<PathBuf> {
        (**self).current_file(root, timestamp)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

fn has_separator(name: &str) -> bool {
    name.contains('/') || name.contains('\\')
}

fn validate_pattern(component: &str, pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        return Err(LoggerError::config(component, "name pattern must not be empty."));
    }
    if has_separator(pattern) {
        return Err(LoggerError::config(
            component,
            "name pattern must not contain path separators.",
        ));
    }
    Ok(())
}

fn resolve(root: &Path, name: String) -> Result<PathBuf> {
    if has_separator(&name) {
        return Err(LoggerError::file_rotation(
            root.join(&name).display().to_string(),
            "file name must not contain path separators",
        ));
    }
    Ok(root.join(name))
}

/// One file per process run.
///
/// The path is chosen at initialization from the first entry's timestamp and
/// never changes afterwards.
///
/// ```
/// use rust_log_pipeline::consumers::StartupRotationPolicy;
/// use rust_log_pipeline::core::TimestampFormat;
///
/// let policy = StartupRotationPolicy::new("Startup {TIMESTAMP}-{ID}.log", TimestampFormat::Date);
/// assert!(policy.is_ok());
/// assert!(StartupRotationPolicy::new("app.log", TimestampFormat::Date).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct StartupRotationPolicy {
    pattern: String,
    timestamp_format: TimestampFormat,
    file_name: Option<String>,
}

impl StartupRotationPolicy {
    pub fn new(pattern: impl Into<String>, timestamp_format: TimestampFormat) -> Result<Self> {
        let pattern = pattern.into();
        validate_pattern("StartupRotationPolicy", &pattern)?;
        if !pattern.contains(TIMESTAMP_PLACEHOLDER) && !pattern.contains(ID_PLACEHOLDER) {
            return Err(LoggerError::config(
                "StartupRotationPolicy",
                "name pattern must contain {TIMESTAMP} or {ID}.",
            ));
        }
        timestamp_format.validate()?;

        Ok(Self {
            pattern,
            timestamp_format,
            file_name: None,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// File name chosen at initialization
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }
}

impl RotationPolicy for StartupRotationPolicy {
    fn initialize(&mut self, root: &Path, timestamp: DateTime<Utc>) -> Result<()> {
        let stamped = self.pattern.replace(
            TIMESTAMP_PLACEHOLDER,
            &self.timestamp_format.try_format(&timestamp)?,
        );

        let name = if stamped.contains(ID_PLACEHOLDER) {
            let mut id: u64 = 1;
            loop {
                let candidate = stamped.replace(ID_PLACEHOLDER, &id.to_string());
                if !root.join(&candidate).exists() {
                    break candidate;
                }
                id += 1;
            }
        } else {
            stamped
        };

        self.file_name = Some(name);
        Ok(())
    }

    fn current_file(&self, root: &Path, _timestamp: DateTime<Utc>) -> Result<PathBuf> {
        match &self.file_name {
            Some(name) => resolve(root, name.clone()),
            None => Err(LoggerError::file_rotation(
                root.display().to_string(),
                "startup policy used before initialization",
            )),
        }
    }

    fn name(&self) -> &str {
        "startup"
    }
}

/// Calendar field a temporal policy buckets on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeField {
    /// Second of minute
    Second,
    /// Minute of hour
    Minute,
    /// Hour of day
    Hour,
    /// Day of month, counted from 1
    Day,
}

impl TimeField {
    /// Round `timestamp` down to the start of its bucket of `step_width`
    /// units; every smaller field is zeroed.
    pub fn floor(self, timestamp: DateTime<Utc>, step_width: u32) -> DateTime<Utc> {
        let step = step_width.max(1);
        let down = |value: u32| value / step * step;
        let date = timestamp.date_naive();

        let floored = match self {
            TimeField::Second => {
                date.and_hms_opt(timestamp.hour(), timestamp.minute(), down(timestamp.second()))
            }
            TimeField::Minute => date.and_hms_opt(timestamp.hour(), down(timestamp.minute()), 0),
            TimeField::Hour => date.and_hms_opt(down(timestamp.hour()), 0, 0),
            TimeField::Day => date
                .with_day(down(date.day() - 1) + 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
        };

        floored.map(|naive| naive.and_utc()).unwrap_or(timestamp)
    }
}

impl fmt::Display for TimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeField::Second => "second",
            TimeField::Minute => "minute",
            TimeField::Hour => "hour",
            TimeField::Day => "day",
        };
        f.write_str(name)
    }
}

impl FromStr for TimeField {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "second" | "seconds" | "second_of_minute" => Ok(TimeField::Second),
            "minute" | "minutes" | "minute_of_hour" => Ok(TimeField::Minute),
            "hour" | "hours" | "hour_of_day" => Ok(TimeField::Hour),
            "day" | "days" | "day_of_month" => Ok(TimeField::Day),
            _ => Err(LoggerError::config(
                "TimeField",
                format!("Invalid value for time field: {}", s),
            )),
        }
    }
}

/// One file per fixed time bucket.
///
/// The entry timestamp is floored to a multiple of `step_width` in the chosen
/// [`TimeField`] and formatted into `{TIMESTAMP}`. Decisions use each entry's
/// own timestamp, so out-of-order entries land in their own bucket.
#[derive(Debug, Clone)]
pub struct TemporalRotationPolicy {
    pattern: String,
    timestamp_format: TimestampFormat,
    step_width: u32,
    field: TimeField,
}

impl TemporalRotationPolicy {
    pub fn new(
        pattern: impl Into<String>,
        timestamp_format: TimestampFormat,
        step_width: u32,
        field: TimeField,
    ) -> Result<Self> {
        let pattern = pattern.into();
        if step_width < 1 {
            return Err(LoggerError::config(
                "TemporalRotationPolicy",
                "step_width must be positive.",
            ));
        }
        validate_pattern("TemporalRotationPolicy", &pattern)?;
        if !pattern.contains(TIMESTAMP_PLACEHOLDER) {
            return Err(LoggerError::config(
                "TemporalRotationPolicy",
                "name pattern must contain {TIMESTAMP}.",
            ));
        }
        timestamp_format.validate()?;

        Ok(Self {
            pattern,
            timestamp_format,
            step_width,
            field,
        })
    }

    pub fn step_width(&self) -> u32 {
        self.step_width
    }

    pub fn field(&self) -> TimeField {
        self.field
    }
}

impl RotationPolicy for TemporalRotationPolicy {
    fn initialize(&mut self, _root: &Path, _timestamp: DateTime<Utc>) -> Result<()> {
        Ok(())
    }

    fn current_file(&self, root: &Path, timestamp: DateTime<Utc>) -> Result<PathBuf> {
        let bucket = self.field.floor(timestamp, self.step_width);
        let name = self.pattern.replace(
            TIMESTAMP_PLACEHOLDER,
            &self.timestamp_format.try_format(&bucket)?,
        );
        resolve(root, name)
    }

    fn name(&self) -> &str {
        "temporal"
    }
}
