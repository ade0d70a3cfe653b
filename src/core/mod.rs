//! Core logger types and traits

pub mod config;
pub mod consumer;
pub mod diagnostic;
pub mod error;
pub mod formatter;
pub mod lazy;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod message;
pub mod metrics;
pub mod pipeline;
pub mod producer;
pub mod timestamp;

pub use config::{ConsoleConfig, DispatchConfig, LoggerConfig, RotationConfig};
pub use consumer::Consumer;
pub use diagnostic::{error_chain, PipelineError};
pub use error::{BoxError, Cause, LoggerError, Result};
pub use formatter::{
    Filter, Formatter, LevelFilter, LevelFormatter, MessageFormatter, RejectAllFilter,
    ThreadFormatter, TimestampFormatter,
};
pub use lazy::AtomicLazy;
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::{DispatchMode, Logger, LoggerBuilder};
pub use message::{Argument, LazyMessage, ParameterizedMessage};
pub use metrics::LoggerMetrics;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use producer::{Producer, Rendered, Step};
pub use timestamp::TimestampFormat;
