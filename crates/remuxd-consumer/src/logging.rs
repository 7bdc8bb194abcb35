//! Structured task logging.
//!
//! Consistent lifecycle logging for one work item, with the torrent
//! name attached to every event.

use tracing::{error, info, warn, Span};

/// Logger for one work item's processing.
#[derive(Debug, Clone)]
pub struct TaskLogger {
    torrent: String,
}

impl TaskLogger {
    pub fn new(torrent: &str) -> Self {
        Self {
            torrent: torrent.to_string(),
        }
    }

    pub fn start(&self, message: &str) {
        info!(torrent = %self.torrent, "Task started: {}", message);
    }

    pub fn progress(&self, message: &str) {
        info!(torrent = %self.torrent, "Task progress: {}", message);
    }

    pub fn warning(&self, message: &str) {
        warn!(torrent = %self.torrent, "Task warning: {}", message);
    }

    pub fn error(&self, message: &str) {
        error!(torrent = %self.torrent, "Task error: {}", message);
    }

    pub fn completion(&self, message: &str) {
        info!(torrent = %self.torrent, "Task completed: {}", message);
    }

    pub fn torrent(&self) -> &str {
        &self.torrent
    }

    /// Create a tracing span for this task.
    pub fn span(&self) -> Span {
        tracing::info_span!("task", torrent = %self.torrent)
    }
}
