//! Consumer error types.

use thiserror::Error;

pub type ConsumerResult<T> = Result<T, ConsumerError>;

/// Process-fatal errors.
///
/// Per-file and per-delivery failures never reach this type; they are
/// absorbed by the processing state machine. Anything surfacing here
/// terminates the process for the supervisor to restart.
#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Broker error: {0}")]
    Broker(#[from] remuxd_broker::BrokerError),

    #[error("Broker connection lost")]
    ConnectionLost,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
