//! File consumer implementation

use crate::core::{Consumer, LogEntry, LoggerError, Result};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends rendered entries to a single file.
///
/// The file is opened in create+append mode; every entry is written with a
/// trailing newline and flushed immediately.
pub struct FileConsumer {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileConsumer {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "creating log directory",
                    format!("cannot create '{}'", parent.display()),
                    e,
                )
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LoggerError::file_consumer(path.display().to_string(), e.to_string()))?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Consumer for FileConsumer {
    fn consume(&self, _entry: &LogEntry, formatted: &str) -> Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(formatted.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileConsumer {
    fn drop(&mut self) {
        let _ = self.writer.get_mut().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use tempfile::tempdir;

    #[test]
    fn test_appends_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("app.log");
        let entry = LogEntry::new(LogLevel::Info, "x");

        {
            let consumer = FileConsumer::new(&path).unwrap();
            consumer.consume(&entry, "first").unwrap();
            consumer.consume(&entry, "second").unwrap();
            assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
        }

        let reopened = FileConsumer::new(&path).unwrap();
        reopened.consume(&entry, "third").unwrap();
        assert_eq!(
            std::fs::read_to_string(reopened.path()).unwrap(),
            "first\nsecond\nthird\n"
        );
    }
}
