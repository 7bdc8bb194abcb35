//! Outbound wire messages.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Completion message published to the done queue.
///
/// One per work item, not per file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoneMessage {
    /// Work item identifier (the torrent name).
    pub filename: String,

    /// Always "processed".
    pub status: String,

    /// RFC 3339 timestamp of completion.
    pub time: String,
}

impl DoneMessage {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: "processed".to_string(),
            time: Utc::now().to_rfc3339(),
        }
    }
}

/// Envelope published to the dead-letter queue for permanently failed
/// work items.
///
/// Carries the original payload verbatim so replay tooling can re-drive
/// the message later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadLetterEnvelope {
    /// Raw bytes of the failed payload.
    #[serde(rename = "originalMessage")]
    pub original_message: String,

    /// Structured reason for the rejection.
    #[serde(rename = "errorReason")]
    pub error_reason: String,

    /// RFC 3339 timestamp of the rejection.
    pub timestamp: String,
}

impl DeadLetterEnvelope {
    pub fn new(original: &[u8], reason: impl Into<String>) -> Self {
        Self {
            original_message: String::from_utf8_lossy(original).into_owned(),
            error_reason: reason.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_done_message_shape() {
        let msg = DoneMessage::new("showA");
        assert_eq!(msg.filename, "showA");
        assert_eq!(msg.status, "processed");
        assert!(DateTime::parse_from_rfc3339(&msg.time).is_ok());

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["status"], "processed");
        assert_eq!(json["filename"], "showA");
        assert!(json["time"].is_string());
    }

    #[test]
    fn test_envelope_wire_field_names() {
        let envelope = DeadLetterEnvelope::new(b"payload", "reason");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["originalMessage"], "payload");
        assert_eq!(json["errorReason"], "reason");
        assert!(DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_envelope_round_trips_original_payload() {
        let original = br#"{"torrentName":"showA","category":"ghost"}"#;
        let envelope = DeadLetterEnvelope::new(original, "Unknown category: ghost");

        let encoded = serde_json::to_vec(&envelope).unwrap();
        let decoded: DeadLetterEnvelope = serde_json::from_slice(&encoded).unwrap();

        assert_eq!(decoded.original_message.as_bytes(), original);
        assert_eq!(decoded.error_reason, "Unknown category: ghost");
    }
}
