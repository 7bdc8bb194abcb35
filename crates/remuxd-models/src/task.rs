//! Inbound task messages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoding failure for an inbound task payload.
///
/// Malformed payloads can never succeed on redelivery, so the consumer
/// routes them to the dead-letter queue instead of requeueing.
#[derive(Debug, Error)]
#[error("JSON parsing error: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// A work item consumed from the task queue.
///
/// Published by the download automation when a torrent finishes; one
/// message per completed download. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMessage {
    /// Directory name of the finished download, relative to the category root.
    #[serde(rename = "torrentName")]
    pub torrent_name: String,

    /// Category tag that selects the library root.
    pub category: String,
}

impl TaskMessage {
    pub fn new(torrent_name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            torrent_name: torrent_name.into(),
            category: category.into(),
        }
    }

    /// Decode a raw message body into a task.
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(body)?)
    }
}
