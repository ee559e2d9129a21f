//! Notifications
//!
//! A severity-tagged message queue fed by the session. This is a side
//! channel for the presentation layer; engine correctness never depends
//! on it, and expiry timers belong to the consumer.

use serde::{Deserialize, Serialize};

/// How a message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A rejected operation.
    Error,

    /// A completed operation.
    Success,

    /// Advisory, neither of the above.
    Warning,
}

/// A single human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Queue-unique identifier, usable for dismissal.
    pub id: u64,

    /// Human-readable text.
    pub message: String,

    /// Presentation severity.
    pub severity: Severity,
}

/// Pending notifications in arrival order.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    entries: Vec<Notification>,
    next_id: u64,
}

impl NotificationQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, returning its queue-unique id.
    pub fn push(&mut self, message: impl Into<String>, severity: Severity) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.entries.push(Notification {
            id,
            message: message.into(),
            severity,
        });

        id
    }

    /// Remove one notification by id; unknown ids are a no-op.
    pub fn dismiss(&mut self, id: u64) {
        self.entries.retain(|notification| notification.id != id);
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Take all pending notifications, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.entries)
    }

    /// Iterate over pending notifications in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Number of pending notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
