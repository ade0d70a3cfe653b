//! In-memory consumer, mainly for tests

use crate::core::{Consumer, LogEntry, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::time::Duration;

/// How long [`BufferConsumer::next_entry`] waits before giving up
pub const DEFAULT_WAIT: Duration = Duration::from_secs(5);

/// Queues rendered entries for later inspection.
///
/// Clones share the same queue, so a clone can be handed to a pipeline while
/// the original is kept to read from.
#[derive(Clone)]
pub struct BufferConsumer {
    sender: Sender<String>,
    receiver: Receiver<String>,
}

impl BufferConsumer {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Next rendered entry, waiting up to [`DEFAULT_WAIT`]
    pub fn next_entry(&self) -> Option<String> {
        self.next_entry_timeout(DEFAULT_WAIT)
    }

    pub fn next_entry_timeout(&self, timeout: Duration) -> Option<String> {
        self.receiver.recv_timeout(timeout).ok()
    }

    pub fn try_next_entry(&self) -> Option<String> {
        self.receiver.try_recv().ok()
    }

    /// Everything queued so far, oldest first
    pub fn drain(&self) -> Vec<String> {
        self.receiver.try_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for BufferConsumer {
    fn default() -> Self {
        Self::new()
    }
}

impl Consumer for BufferConsumer {
    fn consume(&self, _entry: &LogEntry, formatted: &str) -> Result<()> {
        // Both ends live in self, so the channel cannot be disconnected
        let _ = self.sender.send(formatted.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "buffer"
    }
}
