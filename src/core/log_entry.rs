//! Log entry structure

use super::error::{Cause, LoggerError, Result};
use super::lazy::AtomicLazy;
use super::log_level::LogLevel;
use super::message::LazyMessage;
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::fmt;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

/// Get cached thread name, computing and caching it on first access
fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

enum Message {
    Eager(String),
    Lazy(AtomicLazy<String>),
}

/// One log event. Built once per log call and never modified afterwards.
pub struct LogEntry {
    level: LogLevel,
    timestamp: DateTime<Utc>,
    message: Message,
    cause: Option<Cause>,
    thread_id: String,
    thread_name: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self::with_message(level, Message::Eager(message.into()))
    }

    /// Entry whose message is computed on first use, then cached
    pub fn lazy(level: LogLevel, message: impl LazyMessage + 'static) -> Self {
        let cell = AtomicLazy::new(move || message.evaluate());
        Self::with_message(level, Message::Lazy(cell))
    }

    fn with_message(level: LogLevel, message: Message) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            message,
            cause: None,
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
        }
    }

    /// Attach the error this entry reports on
    #[must_use]
    pub fn with_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The message text.
    ///
    /// Lazy messages are evaluated on the first call; every later call returns
    /// the same text or the same [`LoggerError::Evaluation`] failure.
    pub fn message(&self) -> Result<&str> {
        match &self.message {
            Message::Eager(message) => Ok(message),
            Message::Lazy(cell) => cell
                .get()
                .map(String::as_str)
                .map_err(|cause| LoggerError::Evaluation {
                    level: self.level,
                    cause,
                }),
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self.message, Message::Lazy(_))
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn thread_name(&self) -> Option<&str> {
        self.thread_name.as_deref()
    }
}

impl fmt::Debug for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("LogEntry");
        debug
            .field("level", &self.level)
            .field("timestamp", &self.timestamp);
        match &self.message {
            Message::Eager(message) => debug.field("message", message),
            Message::Lazy(cell) => debug.field("message", cell),
        };
        debug
            .field("cause", &self.cause.as_ref().map(ToString::to_string))
            .field("thread_id", &self.thread_id)
            .field("thread_name", &self.thread_name)
            .finish()
    }
}
