//! Formatting macros over [`Logger`](crate::core::Logger).
//!
//! Every macro takes the logger first and `format!`-style arguments last.
//! `cause = <error>` before the format string attaches an error whose
//! chain is rendered below the message.
//!
//! ```
//! use rust_log_pipeline::prelude::*;
//! use rust_log_pipeline::{error, info, log_lazy};
//!
//! let logger = Logger::synchronous(Pipeline::new(Producer::standard(), BufferConsumer::new()));
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
//! error!(logger, cause = refused, "Upstream {} unreachable", "db-1");
//!
//! // Formatting deferred until the entry is rendered
//! let user_id = 42;
//! log_lazy!(logger, LogLevel::Debug, "User {} logged in", user_id);
//! ```

/// Log at an explicit level.
///
/// ```
/// # use rust_log_pipeline::prelude::*;
/// # let logger = Logger::synchronous(Pipeline::new(Producer::standard(), BufferConsumer::new()));
/// use rust_log_pipeline::log;
/// log!(logger, LogLevel::Warn, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, cause = $cause:expr, $($arg:tt)+) => {
        $logger.throwable($level, $cause, format!($($arg)+))
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+))
    };
}

#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

/// Log a message formatted only if, and when, a pipeline renders it.
///
/// Captured values are moved into the deferred computation, so they must be
/// `Send + Sync + 'static`.
///
/// ```
/// # use rust_log_pipeline::prelude::*;
/// # let logger = Logger::synchronous(Pipeline::new(Producer::standard(), BufferConsumer::new()));
/// use rust_log_pipeline::log_lazy;
/// let rows = vec![1, 2, 3];
/// log_lazy!(logger, LogLevel::Info, "Loaded rows: {:?}", rows);
/// ```
#[macro_export]
macro_rules! log_lazy {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_lazy($level, move || {
            ::std::result::Result::Ok::<::std::string::String, $crate::core::BoxError>(format!($($arg)+))
        })
    };
}
