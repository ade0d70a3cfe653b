//! # Rust Log Pipeline
//!
//! A pluggable logging pipeline: every log call becomes an entry that flows
//! through a chain of formatters (a [`Producer`]) into one or more consumers.
//!
//! ## Features
//!
//! - **Lazy messages**: message bodies computed at most once, only when rendered
//! - **Failure containment**: a failing formatter or consumer never reaches the caller
//! - **Rotating files**: startup-based and time-bucketed rotation policies
//! - **Two dispatch modes**: inline, or one background worker in FIFO order
//!
//! ## Example
//!
//! ```
//! use rust_log_pipeline::prelude::*;
//!
//! let buffer = BufferConsumer::new();
//! let pipeline = Pipeline::builder()
//!     .producer(Producer::standard())
//!     .consumer(buffer.clone())
//!     .build()
//!     .unwrap();
//! let logger = Logger::synchronous(pipeline);
//!
//! logger.info("hello");
//! logger.log_parameterized(LogLevel::Warn, ParameterizedMessage::new("{} left").arg(3));
//!
//! assert!(buffer.next_entry().unwrap().ends_with(" INFO] hello"));
//! assert!(buffer.next_entry().unwrap().ends_with(" WARN] 3 left"));
//! ```

pub mod consumers;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::consumers::{
        BufferConsumer, ConsoleConsumer, FileConsumer, RotatingFileConsumer, RotationPolicy,
        StartupRotationPolicy, TemporalRotationPolicy, TimeField,
    };
    pub use crate::core::{
        BoxError, Consumer, DispatchMode, Filter, Formatter, LazyMessage, LevelFilter,
        LevelFormatter, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError,
        LoggerMetrics, MessageFormatter, ParameterizedMessage, Pipeline, Producer,
        RejectAllFilter, Result, ThreadFormatter, TimestampFormat, TimestampFormatter,
    };
}

pub use crate::consumers::{BufferConsumer, ConsoleConsumer, FileConsumer, RotatingFileConsumer};
pub use crate::core::{
    DispatchMode, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError,
    LoggerMetrics, ParameterizedMessage, Pipeline, Producer, Result, TimestampFormat,
};
