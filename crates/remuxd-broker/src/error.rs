//! Broker error types and classification.

use thiserror::Error;

/// Result type for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Errors from the broker gateway.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Topology setup failed: {0}")]
    TopologyFailed(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("AMQP error: {0}")]
    Amqp(#[from] lapin::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Closed classification of broker failures.
///
/// Call sites branch on this instead of inspecting reason strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Worth retrying or surviving (soft AMQP errors, IO hiccups).
    Transient,
    /// An entity exists with different arguments (AMQP 406).
    ConfigConflict,
    /// Protocol-level or unrecoverable failure.
    Fatal,
}

impl BrokerError {
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::ConnectionFailed(msg.into())
    }

    pub fn topology_failed(msg: impl Into<String>) -> Self {
        Self::TopologyFailed(msg.into())
    }

    /// Classify this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            BrokerError::Amqp(err) => classify_amqp(err),
            BrokerError::ConnectionFailed(_) => ErrorClass::Fatal,
            BrokerError::TopologyFailed(_) => ErrorClass::Fatal,
            BrokerError::PublishFailed(_) => ErrorClass::Transient,
            BrokerError::Json(_) => ErrorClass::Fatal,
        }
    }

    pub fn is_config_conflict(&self) -> bool {
        self.class() == ErrorClass::ConfigConflict
    }
}

/// Classify a lapin error, preferring the structured AMQP error code
/// over reason strings.
///
/// Reason substrings are a last resort; brokers do not keep them
/// stable across versions.
fn classify_amqp(err: &lapin::Error) -> ErrorClass {
    use lapin::protocol::{AMQPErrorKind, AMQPSoftError};

    match err {
        lapin::Error::ProtocolError(amqp) => match amqp.kind() {
            AMQPErrorKind::Soft(AMQPSoftError::PRECONDITIONFAILED) => ErrorClass::ConfigConflict,
            AMQPErrorKind::Soft(_) => ErrorClass::Transient,
            AMQPErrorKind::Hard(_) => ErrorClass::Fatal,
        },
        lapin::Error::IOError(_) => ErrorClass::Transient,
        other => {
            let text = other.to_string();
            if text.contains("PRECONDITION_FAILED") || text.contains("inequivalent arg") {
                ErrorClass::ConfigConflict
            } else {
                ErrorClass::Fatal
            }
        }
    }
}
