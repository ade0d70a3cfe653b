//! Main logger implementation

use super::{
    diagnostic::error_chain,
    error::{require_properties, BoxError, Cause, LoggerError, Result},
    log_entry::LogEntry,
    log_level::LogLevel,
    message::{LazyMessage, ParameterizedMessage},
    metrics::LoggerMetrics,
    pipeline::Pipeline,
    producer::Rendered,
};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Name of the background thread used in asynchronous mode
pub const WORKER_THREAD_NAME: &str = "log-pipeline-worker";

/// Maximum number of entries the worker dispatches before flushing consumers
const BATCH_SIZE: usize = 50;

/// Loggers deliver every standard level unless a minimum level is set
const DEFAULT_MIN_LEVEL: LogLevel = LogLevel::Trace;

/// How entries travel from the calling thread to the pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Dispatch inline on the calling thread
    #[default]
    Synchronous,
    /// Hand entries to one worker thread that processes them in FIFO order.
    ///
    /// `capacity: None` is an unbounded queue; `Some(n)` blocks callers while
    /// `n` entries are pending.
    Asynchronous { capacity: Option<usize> },
}

enum Command {
    Entry(LogEntry),
    /// Barrier: acknowledged once everything queued before it was dispatched
    Flush(Sender<()>),
}

/// The pipelines of a logger plus the routing of self-diagnostics.
///
/// Shared by the logger and its worker thread; immutable after build.
struct Dispatcher {
    pipelines: Vec<Pipeline>,
    metrics: LoggerMetrics,
}

impl Dispatcher {
    fn dispatch(&self, entry: &LogEntry) {
        let mut failure: Option<Cause> = None;
        for pipeline in &self.pipelines {
            if let Rendered::EvaluationFailed(cause) = pipeline.dispatch(entry, &self.metrics) {
                failure.get_or_insert(cause);
            }
        }

        if let Some(cause) = failure {
            self.metrics.record_evaluation_failure();
            self.report_evaluation_failure(entry, cause);
        }
    }

    /// One diagnostic per failed entry, sent through every pipeline on the
    /// current thread. Reserved-level entries are printed instead.
    fn report_evaluation_failure(&self, entry: &LogEntry, cause: Cause) {
        let message = format!(
            "Could not evaluate lazy message at level: {}",
            entry.level().marker()
        );
        if entry.level().is_reserved() {
            eprintln!("[LOGGER ERROR] {}\n{}", message, error_chain(&*cause));
            return;
        }

        let diagnostic = LogEntry::new(LogLevel::Logger, message).with_cause(cause);
        self.dispatch(&diagnostic);
    }

    fn process_batch(&self, batch: &mut Vec<LogEntry>) {
        if batch.is_empty() {
            return;
        }
        for entry in batch.drain(..) {
            self.dispatch(&entry);
        }
        self.flush();
        self.metrics.record_batch();
    }

    fn flush(&self) {
        for pipeline in &self.pipelines {
            pipeline.flush();
        }
    }
}

fn run_worker(dispatcher: &Dispatcher, receiver: &Receiver<Command>) {
    let mut batch = Vec::with_capacity(BATCH_SIZE);

    // Exits once every sender is gone and the queue is empty
    while let Ok(first) = receiver.recv() {
        let mut next = Some(first);
        while let Some(command) = next.take() {
            match command {
                Command::Entry(entry) => batch.push(entry),
                Command::Flush(ack) => {
                    dispatcher.process_batch(&mut batch);
                    dispatcher.flush();
                    let _ = ack.send(());
                }
            }
            if batch.len() < BATCH_SIZE {
                next = receiver.try_recv().ok();
            }
        }
        dispatcher.process_batch(&mut batch);
    }
}

/// Front end of the logging pipelines.
///
/// A logger owns a fixed, non-empty list of [`Pipeline`]s. Every accepted
/// call becomes one [`LogEntry`] that each pipeline renders once and hands to
/// its consumers. Nothing that goes wrong after construction reaches the
/// caller: failures are contained per formatter and per consumer and
/// reported on stderr.
///
/// # Example
///
/// ```
/// use rust_log_pipeline::prelude::*;
///
/// let buffer = BufferConsumer::new();
/// let logger = Logger::builder()
///     .pipeline(Pipeline::new(Producer::new().formatter(MessageFormatter), buffer.clone()))
///     .asynchronous(Some(1000))
///     .build()
///     .unwrap();
///
/// logger.info("started");
/// logger.shutdown();
/// assert_eq!(buffer.drain(), vec!["started".to_string()]);
/// ```
pub struct Logger {
    dispatcher: Arc<Dispatcher>,
    mode: DispatchMode,
    min_level: RwLock<LogLevel>,
    disabled: AtomicBool,
    stopped: AtomicBool,
    sender: RwLock<Option<Sender<Command>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Logger dispatching on the calling thread through one pipeline
    pub fn synchronous(pipeline: Pipeline) -> Self {
        Self::assemble(
            vec![pipeline],
            DEFAULT_MIN_LEVEL,
            DispatchMode::Synchronous,
            None,
        )
    }

    /// Logger with an unbounded queue and one worker thread
    pub fn asynchronous(pipeline: Pipeline) -> Result<Self> {
        Self::start(
            vec![pipeline],
            DEFAULT_MIN_LEVEL,
            DispatchMode::Asynchronous { capacity: None },
        )
    }

    fn start(pipelines: Vec<Pipeline>, min_level: LogLevel, mode: DispatchMode) -> Result<Self> {
        let capacity = match mode {
            DispatchMode::Synchronous => {
                return Ok(Self::assemble(pipelines, min_level, mode, None));
            }
            DispatchMode::Asynchronous { capacity } => capacity,
        };

        let (sender, receiver) = match capacity {
            Some(capacity) => bounded(capacity),
            None => unbounded(),
        };
        let logger = Self::assemble(pipelines, min_level, mode, Some(sender));

        let worker_dispatcher = Arc::clone(&logger.dispatcher);
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(&worker_dispatcher, &receiver))
            .map_err(|e| {
                LoggerError::io_operation(
                    "starting async worker",
                    "could not spawn worker thread",
                    e,
                )
            })?;
        *logger.worker.lock() = Some(handle);

        Ok(logger)
    }

    fn assemble(
        pipelines: Vec<Pipeline>,
        min_level: LogLevel,
        mode: DispatchMode,
        sender: Option<Sender<Command>>,
    ) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher {
                pipelines,
                metrics: LoggerMetrics::new(),
            }),
            mode,
            min_level: RwLock::new(min_level),
            disabled: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            sender: RwLock::new(sender),
            worker: Mutex::new(None),
        }
    }

    /// Whether a call at `level` would produce an entry.
    ///
    /// Checked before the entry (and its timestamp) is created.
    fn accepts(&self, level: LogLevel) -> bool {
        if self.disabled.load(Ordering::Relaxed) {
            return false;
        }
        level.is_reserved() || level >= *self.min_level.read()
    }

    fn submit(&self, entry: LogEntry) {
        if let Err(e) = self.enqueue(entry) {
            self.reject(&e);
        }
    }

    /// Dispatch inline or hand the entry to the worker
    fn enqueue(&self, entry: LogEntry) -> Result<()> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(LoggerError::LoggerStopped);
        }

        match self.mode {
            DispatchMode::Synchronous => {
                self.dispatcher.metrics.record_logged();
                self.dispatcher.dispatch(&entry);
            }
            DispatchMode::Asynchronous { .. } => {
                let sender = self.sender.read();
                let tx = sender.as_ref().ok_or(LoggerError::LoggerStopped)?;
                tx.send(Command::Entry(entry))
                    .map_err(|_| LoggerError::ChannelSendError)?;
                self.dispatcher.metrics.record_logged();
            }
        }
        Ok(())
    }

    fn reject(&self, error: &LoggerError) {
        if self.dispatcher.metrics.record_rejected() == 0 {
            eprintln!(
                "[LOGGER WARNING] {}, rejected entries are discarded.",
                error
            );
        }
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if !self.accepts(level) {
            return;
        }
        self.submit(LogEntry::new(level, message));
    }

    /// Log a message computed at most once, on first rendering
    pub fn log_lazy(&self, level: LogLevel, message: impl LazyMessage + 'static) {
        if !self.accepts(level) {
            return;
        }
        self.submit(LogEntry::lazy(level, message));
    }

    pub fn log_parameterized(&self, level: LogLevel, message: ParameterizedMessage) {
        self.log_lazy(level, message);
    }

    /// Log a message together with the error that caused it; the error chain
    /// is rendered below the message
    pub fn throwable(
        &self,
        level: LogLevel,
        cause: impl Into<BoxError>,
        message: impl Into<String>,
    ) {
        if !self.accepts(level) {
            return;
        }
        let cause: Cause = Arc::from(cause.into());
        self.submit(LogEntry::new(level, message).with_cause(cause));
    }

    pub fn throwable_lazy(
        &self,
        level: LogLevel,
        cause: impl Into<BoxError>,
        message: impl LazyMessage + 'static,
    ) {
        if !self.accepts(level) {
            return;
        }
        let cause: Cause = Arc::from(cause.into());
        self.submit(LogEntry::lazy(level, message).with_cause(cause));
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }

    /// Flush every consumer.
    ///
    /// In asynchronous mode this waits until all entries accepted before the
    /// call have been dispatched.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = bounded(1);
        let sender = self.sender.read();
        let queued = match sender.as_ref() {
            Some(tx) => tx.send(Command::Flush(ack_tx)).is_ok(),
            None => false,
        };
        drop(sender);

        if queued {
            if ack_rx.recv().is_err() {
                eprintln!("[LOGGER ERROR] Async worker stopped before acknowledging flush");
            }
        } else {
            self.dispatcher.flush();
        }
    }

    /// Stop accepting entries, drain everything already accepted and flush.
    ///
    /// Idempotent. Entries logged afterwards are counted in
    /// [`LoggerMetrics::rejected`].
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }

        // Closing the channel lets the worker exit once the queue is empty
        drop(self.sender.write().take());

        if let Some(handle) = self.worker.lock().take() {
            if let Err(e) = handle.join() {
                eprintln!(
                    "[LOGGER ERROR] Async worker thread panicked during shutdown: {:?}",
                    e
                );
            }
        }

        self.dispatcher.flush();
    }

    /// Ignore every call, including reserved levels, until [`enable`](Self::enable)
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Relaxed);
    }

    pub fn enable(&self) {
        self.disabled.store(false, Ordering::Relaxed);
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    pub fn set_min_level(&self, level: LogLevel) {
        *self.min_level.write() = level;
    }

    pub fn min_level(&self) -> LogLevel {
        *self.min_level.read()
    }

    pub fn is_asynchronous(&self) -> bool {
        matches!(self.mode, DispatchMode::Asynchronous { .. })
    }

    pub fn dispatch_mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn pipelines(&self) -> &[Pipeline] {
        &self.dispatcher.pipelines
    }

    /// Get the logger metrics for detailed observability
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.dispatcher.metrics
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("mode", &self.mode)
            .field("pipelines", &self.dispatcher.pipelines.len())
            .field("min_level", &self.min_level())
            .field("disabled", &self.is_disabled())
            .field("stopped", &self.stopped.load(Ordering::Relaxed))
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_log_pipeline::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .pipeline(Pipeline::new(Producer::standard(), ConsoleConsumer::new()))
///     .asynchronous(Some(1000))
///     .build()
///     .unwrap();
/// assert!(logger.is_asynchronous());
/// ```
pub struct LoggerBuilder {
    pipelines: Vec<Pipeline>,
    min_level: LogLevel,
    mode: DispatchMode,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            pipelines: Vec::new(),
            min_level: DEFAULT_MIN_LEVEL,
            mode: DispatchMode::Synchronous,
        }
    }

    /// Add a pipeline; pipelines receive entries in the order they were added
    #[must_use = "builder methods return a new value"]
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipelines.push(pipeline);
        self
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn dispatch(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn synchronous(self) -> Self {
        self.dispatch(DispatchMode::Synchronous)
    }

    /// Enable async mode; `None` means an unbounded queue
    #[must_use = "builder methods return a new value"]
    pub fn asynchronous(self, capacity: Option<usize>) -> Self {
        self.dispatch(DispatchMode::Asynchronous { capacity })
    }

    /// Build the Logger; at least one pipeline is required
    pub fn build(self) -> Result<Logger> {
        let mut missing = Vec::new();
        if self.pipelines.is_empty() {
            missing.push("pipelines");
        }
        require_properties(missing)?;

        Logger::start(self.pipelines, self.min_level, self.mode)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumers::BufferConsumer;
    use crate::core::formatter::{LevelFormatter, MessageFormatter};
    use crate::core::producer::Producer;

    fn marker_pipeline(buffer: &BufferConsumer) -> Pipeline {
        let producer = Producer::new()
            .formatter(LevelFormatter::new())
            .text(" ")
            .formatter(MessageFormatter);
        Pipeline::new(producer, buffer.clone())
    }

    #[test]
    fn test_builder_requires_pipelines() {
        let err = Logger::builder().build().unwrap_err();
        assert_eq!(err.to_string(), "These properties must be set: pipelines.");
    }

    #[test]
    fn test_default_logger_delivers_every_standard_level() {
        let buffer = BufferConsumer::new();
        let logger = Logger::synchronous(marker_pipeline(&buffer));
        assert_eq!(logger.min_level(), LogLevel::Trace);

        for level in LogLevel::STANDARD {
            logger.log(level, "x");
        }
        assert_eq!(buffer.drain().len(), 6);

        let logger = Logger::builder()
            .pipeline(marker_pipeline(&buffer))
            .asynchronous(None)
            .build()
            .unwrap();
        logger.trace("fine");
        logger.debug("details");
        logger.flush();
        assert_eq!(buffer.drain(), vec!["TRACE fine", "DEBUG details"]);
    }

    #[test]
    fn test_min_level_gate() {
        let buffer = BufferConsumer::new();
        let logger = Logger::builder()
            .pipeline(marker_pipeline(&buffer))
            .min_level(LogLevel::Warn)
            .build()
            .unwrap();

        logger.info("dropped");
        logger.warn("kept");
        logger.log(LogLevel::Logger, "reserved");

        assert_eq!(buffer.drain(), vec!["WARN kept", "LOGGER reserved"]);
        assert_eq!(logger.metrics().total_logged(), 2);
    }

    #[test]
    fn test_disable_stops_everything() {
        let buffer = BufferConsumer::new();
        let logger = Logger::synchronous(marker_pipeline(&buffer));

        logger.disable();
        assert!(logger.is_disabled());
        logger.error("ignored");
        logger.log(LogLevel::Logger, "ignored too");
        assert!(buffer.try_next_entry().is_none());

        logger.enable();
        logger.error("back");
        assert_eq!(buffer.drain(), vec!["ERROR back"]);
    }

    #[test]
    fn test_lazy_message_is_not_built_below_min_level() {
        let buffer = BufferConsumer::new();
        let logger = Logger::synchronous(marker_pipeline(&buffer));
        logger.set_min_level(LogLevel::Error);
        assert_eq!(logger.min_level(), LogLevel::Error);

        logger.log_lazy(LogLevel::Debug, || -> std::result::Result<String, BoxError> {
            panic!("must not be evaluated")
        });
        assert_eq!(logger.metrics().total_logged(), 0);
    }

    #[test]
    fn test_evaluation_failure_becomes_one_diagnostic() {
        let first = BufferConsumer::new();
        let second = BufferConsumer::new();
        let logger = Logger::builder()
            .pipeline(marker_pipeline(&first))
            .pipeline(marker_pipeline(&second))
            .build()
            .unwrap();

        logger.log_lazy(LogLevel::Warn, || Err::<String, BoxError>("no data".into()));

        for buffer in [&first, &second] {
            let lines = buffer.drain();
            assert_eq!(lines.len(), 1);
            assert_eq!(
                lines[0],
                "LOGGER Could not evaluate lazy message at level: WARN\nno data"
            );
        }
        assert_eq!(logger.metrics().evaluation_failures(), 1);
    }

    #[test]
    fn test_reserved_level_evaluation_failure_is_printed() {
        let buffer = BufferConsumer::new();
        let logger = Logger::synchronous(marker_pipeline(&buffer));

        logger.log_lazy(LogLevel::Logger, || Err::<String, BoxError>("broken".into()));

        assert!(buffer.try_next_entry().is_none());
        assert_eq!(logger.metrics().evaluation_failures(), 1);
        assert_eq!(logger.metrics().total_logged(), 1);
        assert_eq!(logger.metrics().delivered(), 0);
    }

    #[test]
    fn test_async_flush_is_a_barrier() {
        let buffer = BufferConsumer::new();
        let logger = Logger::builder()
            .pipeline(marker_pipeline(&buffer))
            .asynchronous(Some(8))
            .build()
            .unwrap();
        assert!(logger.is_asynchronous());

        for i in 0..100 {
            logger.info(format!("entry {}", i));
        }
        logger.flush();

        let lines = buffer.drain();
        assert_eq!(lines.len(), 100);
        assert_eq!(lines[0], "INFO entry 0");
        assert_eq!(lines[99], "INFO entry 99");
    }

    #[test]
    fn test_shutdown_drains_and_rejects_later_entries() {
        let buffer = BufferConsumer::new();
        let logger = Logger::asynchronous(marker_pipeline(&buffer)).unwrap();

        for i in 0..10 {
            logger.info(format!("entry {}", i));
        }
        logger.shutdown();
        assert_eq!(buffer.drain().len(), 10);

        logger.info("too late");
        logger.shutdown();
        assert!(buffer.try_next_entry().is_none());
        assert_eq!(logger.metrics().rejected(), 1);
        assert_eq!(logger.metrics().total_logged(), 10);
    }

    #[test]
    fn test_enqueue_after_shutdown_reports_stopped() {
        let buffer = BufferConsumer::new();
        for logger in [
            Logger::synchronous(marker_pipeline(&buffer)),
            Logger::asynchronous(marker_pipeline(&buffer)).unwrap(),
        ] {
            logger.shutdown();
            let err = logger
                .enqueue(LogEntry::new(LogLevel::Info, "late"))
                .unwrap_err();
            assert!(matches!(err, LoggerError::LoggerStopped));
        }
        assert!(buffer.try_next_entry().is_none());
    }

    #[test]
    fn test_drop_drains_async_queue() {
        let buffer = BufferConsumer::new();
        {
            let logger = Logger::asynchronous(marker_pipeline(&buffer)).unwrap();
            logger.info("before drop");
        }
        assert_eq!(buffer.drain(), vec!["INFO before drop"]);
    }

    #[test]
    fn test_throwable_renders_cause() {
        let buffer = BufferConsumer::new();
        let logger = Logger::synchronous(marker_pipeline(&buffer));

        logger.throwable(
            LogLevel::Error,
            std::io::Error::other("connection reset"),
            "request failed",
        );
        assert_eq!(
            buffer.drain(),
            vec!["ERROR request failed\nconnection reset"]
        );
    }
}
