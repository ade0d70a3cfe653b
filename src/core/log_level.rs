//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log entry.
///
/// Levels are totally ordered. [`LogLevel::Logger`] is reserved for the
/// pipeline's own diagnostics: it bypasses level filtering and cannot be
/// parsed from configuration.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
    #[serde(skip)]
    Logger = 6,
}

impl LogLevel {
    /// Every level available to application code, in ascending order
    pub const STANDARD: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Short marker used in rendered output
    pub fn marker(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Logger => "LOGGER",
        }
    }

    /// Whether this level is reserved for internal diagnostics
    #[inline]
    pub fn is_reserved(&self) -> bool {
        matches!(self, LogLevel::Logger)
    }

    /// Whether entries at this level belong on stderr
    #[inline]
    pub fn is_severe(&self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Fatal | LogLevel::Logger)
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Trace => BrightBlack,
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
            LogLevel::Logger => Magenta,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marker())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            "LOGGER" => Err("Level 'LOGGER' is reserved".to_string()),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_total() {
        let mut levels = LogLevel::STANDARD.to_vec();
        levels.push(LogLevel::Logger);
        for pair in levels.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_reserved_level() {
        assert!(LogLevel::Logger.is_reserved());
        assert!(LogLevel::STANDARD.iter().all(|level| !level.is_reserved()));
        assert!("logger".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_parse_markers() {
        for level in LogLevel::STANDARD {
            assert_eq!(level.marker().parse::<LogLevel>(), Ok(level));
        }
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_serde_uses_variant_names() {
        let level: LogLevel = serde_json::from_str("\"Debug\"").unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert!(serde_json::from_str::<LogLevel>("\"Logger\"").is_err());
    }
}
