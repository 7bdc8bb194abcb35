//! Durable remux task consumer.
//!
//! This crate provides:
//! - Layered configuration (defaults, YAML file, environment)
//! - The per-delivery processing state machine
//! - The consumer loop with prefetch 1, bounded-time processing,
//!   and crash-on-disconnect lifecycle

pub mod consumer;
pub mod error;
pub mod logging;
pub mod processor;
pub mod settings;

pub use consumer::Consumer;
pub use error::{ConsumerError, ConsumerResult};
pub use logging::TaskLogger;
pub use processor::{process_delivery, Disposition, ProcessorContext};
pub use settings::{BrokerSettings, CategoryMap, Settings, WorkerSettings};
