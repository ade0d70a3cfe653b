//! Rotating file consumer
//!
//! Writes each entry to the file its [`RotationPolicy`] selects, closing the
//! previous file whenever the selected path changes.

use super::rotation::RotationPolicy;
use crate::core::{Consumer, LogEntry, LoggerError, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Outcome of one rotation decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rotation {
    /// No file was open; this one was opened
    Opened(PathBuf),
    /// Keep writing to the open file
    Unchanged,
    /// `from` was closed and `to` opened
    Rotated { from: PathBuf, to: PathBuf },
}

struct LogFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl LogFile {
    fn open(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LoggerError::file_rotation(path.display().to_string(), e.to_string()))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    fn close(mut self) {
        if let Err(e) = self.writer.flush() {
            eprintln!(
                "[LOGGER ERROR] Failed to flush '{}' while closing: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// A policy and the file it currently selects; at most one file is open
pub struct RotationState {
    policy: Box<dyn RotationPolicy>,
    current: Option<LogFile>,
}

impl RotationState {
    pub fn new(policy: impl RotationPolicy + 'static) -> Self {
        Self {
            policy: Box::new(policy),
            current: None,
        }
    }

    /// Make sure the file for `timestamp` is the open one.
    ///
    /// The first call creates `root`, initializes the policy and opens its
    /// file. Later calls close the open file exactly once before opening a
    /// different one.
    pub fn decide(&mut self, root: &Path, timestamp: DateTime<Utc>) -> Result<Rotation> {
        let Some(open) = &self.current else {
            fs::create_dir_all(root).map_err(|e| {
                LoggerError::io_operation(
                    "creating log folder",
                    format!("cannot create '{}'", root.display()),
                    e,
                )
            })?;
            self.policy.initialize(root, timestamp)?;
            let path = self.policy.current_file(root, timestamp)?;
            self.current = Some(LogFile::open(path.clone())?);
            return Ok(Rotation::Opened(path));
        };

        let path = self.policy.current_file(root, timestamp)?;
        if open.path == path {
            return Ok(Rotation::Unchanged);
        }

        let from = open.path.clone();
        if let Some(previous) = self.current.take() {
            previous.close();
        }
        self.current = Some(LogFile::open(path.clone())?);
        Ok(Rotation::Rotated { from, to: path })
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|file| file.path.as_path())
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        let file = self
            .current
            .as_mut()
            .ok_or_else(|| LoggerError::other("no log file is open"))?;
        file.writer.write_all(line.as_bytes())?;
        file.writer.write_all(b"\n")?;
        file.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(file) = self.current.as_mut() {
            file.writer.flush()?;
        }
        Ok(())
    }

    fn replace_policy(&mut self, policy: Box<dyn RotationPolicy>) {
        if let Some(previous) = self.current.take() {
            previous.close();
        }
        self.policy = policy;
    }
}

/// Consumer writing into files under `root` chosen by a [`RotationPolicy`].
///
/// The rotation decision and the write happen under one lock, so concurrent
/// dispatch never writes to a file that is being rotated away.
///
/// # Example
///
/// ```no_run
/// use rust_log_pipeline::consumers::{RotatingFileConsumer, TemporalRotationPolicy, TimeField};
/// use rust_log_pipeline::core::TimestampFormat;
///
/// let policy = TemporalRotationPolicy::new(
///     "Temporal {TIMESTAMP}.log",
///     TimestampFormat::FileSafe,
///     2,
///     TimeField::Second,
/// )?;
/// let consumer = RotatingFileConsumer::new("logs", policy)?;
/// # Ok::<(), rust_log_pipeline::LoggerError>(())
/// ```
pub struct RotatingFileConsumer {
    root: PathBuf,
    state: Mutex<RotationState>,
}

impl RotatingFileConsumer {
    pub fn new(root: impl Into<PathBuf>, policy: impl RotationPolicy + 'static) -> Result<Self> {
        let root = root.into();
        if root.exists() && !root.is_dir() {
            return Err(LoggerError::config(
                "RotatingFileConsumer",
                "root must not be an existing file.",
            ));
        }

        Ok(Self {
            root,
            state: Mutex::new(RotationState::new(policy)),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Swap the policy; the open file is closed and the next entry
    /// initializes the new policy
    pub fn set_policy(&self, policy: impl RotationPolicy + 'static) {
        self.state.lock().replace_policy(Box::new(policy));
    }

    /// Path of the open file, if any entry was written yet
    pub fn current_path(&self) -> Option<PathBuf> {
        self.state.lock().current_path().map(Path::to_path_buf)
    }
}

impl Consumer for RotatingFileConsumer {
    fn consume(&self, entry: &LogEntry, formatted: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.decide(&self.root, entry.timestamp())?;
        state.write_line(formatted)
    }

    fn flush(&self) -> Result<()> {
        self.state.lock().flush()
    }

    fn name(&self) -> &str {
        "rotating_file"
    }
}

impl Drop for RotatingFileConsumer {
    fn drop(&mut self) {
        let _ = self.state.get_mut().flush();
    }
}
