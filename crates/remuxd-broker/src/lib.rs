//! AMQP broker gateway for remuxd.
//!
//! This crate provides:
//! - A thin channel capability trait over the AMQP verbs the consumer
//!   needs (declare, bind, delete, publish, qos)
//! - Typed classification of broker errors (transient, config
//!   conflict, fatal)
//! - Idempotent queue topology setup with dead-letter wiring
//! - Done and dead-letter publishers

pub mod error;
pub mod gateway;
pub mod publisher;
pub mod topology;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{BrokerError, BrokerResult, ErrorClass};
pub use gateway::{connect, AmqpChannel, BrokerChannel, DeadLetterArgs};
pub use publisher::{publish_dead_letter, publish_done};
pub use topology::{ensure_topology, QueueNames, TopologyMode};
