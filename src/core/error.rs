//! Error types for the logging pipeline

use super::log_level::LogLevel;
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, LoggerError>;

/// Boxed error accepted from user code (lazy messages, `throwable` causes)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared, cached failure; the same `Arc` is handed to every observer
pub type Cause = Arc<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON configuration error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Required builder properties were never set
    #[error("These properties must be set: {}.", .0.join(", "))]
    MissingProperties(Vec<String>),

    /// File consumer error with path
    #[error("File consumer error for '{path}': {message}")]
    FileConsumerError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Formatter error with formatter name
    #[error("Formatter error ({formatter}): {message}")]
    FormatterError { formatter: String, message: String },

    /// A lazy message could not be evaluated
    #[error("Could not evaluate lazy message at level {level}: {cause}")]
    Evaluation {
        level: LogLevel,
        #[source]
        cause: Cause,
    },

    /// A lazy initializer panicked instead of returning
    #[error("Lazy initializer panicked: {0}")]
    InitializerPanicked(String),

    /// A parameterized message could not be produced
    #[error("Could not produce parameterized message: {0}.")]
    MessageProduction(&'static str),

    /// Fewer lazy arguments than unset placeholders
    #[error("Too few arguments.")]
    TooFewArguments,

    /// More lazy arguments than unset placeholders
    #[error("Too many arguments.")]
    TooManyArguments,

    /// Entry submitted after shutdown
    #[error("Logger already stopped")]
    LoggerStopped,

    /// The async worker is gone and can no longer take entries
    #[error("Failed to send log entry to async worker")]
    ChannelSendError,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a missing properties error
    pub fn missing<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LoggerError::MissingProperties(properties.into_iter().map(Into::into).collect())
    }

    /// Create a file consumer error
    pub fn file_consumer(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileConsumerError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a formatter error
    pub fn formatter(formatter: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            formatter: formatter.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Whether this error means the message body itself failed, as opposed to
    /// a formatter or consumer
    #[must_use]
    pub fn is_evaluation(&self) -> bool {
        matches!(self, LoggerError::Evaluation { .. })
    }
}

/// Fails with [`LoggerError::MissingProperties`] when any property is missing
pub(crate) fn require_properties(missing: Vec<&'static str>) -> Result<()> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoggerError::missing(missing))
    }
}
