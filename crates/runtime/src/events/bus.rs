//! Broadcast event bus for log entries.

use tokio::sync::broadcast;
use werewolf_core::LogEntry;

/// Fan-out of the entries the controlled player is allowed to see.
///
/// Publishing is best-effort: entries sent while nobody listens are dropped,
/// and slow subscribers observe `RecvError::Lagged`.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LogEntry>,
}

impl EventBus {
    /// Creates a new event bus with default capacity
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tx: broadcast::channel(capacity.max(1)).0,
        }
    }

    pub fn publish(&self, entry: LogEntry) {
        let seq = entry.seq;
        if self.tx.send(entry).is_err() {
            // No subscribers - this is normal, not an error
            tracing::trace!(seq, "no subscribers for log entry");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
