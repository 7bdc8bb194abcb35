//! Shared data models for the remuxd consumer.
//!
//! This crate provides Serde-serializable types for:
//! - Inbound task messages and their decoding
//! - Media tracks and derived track selections
//! - Per-file and per-delivery processing outcomes
//! - Outbound wire messages (done, dead-letter envelope)

pub mod outcome;
pub mod task;
pub mod track;
pub mod wire;

pub use outcome::{DeliveryOutcome, FileOutcome};
pub use task::{DecodeError, TaskMessage};
pub use track::{Track, TrackKind, TrackSelection};
pub use wire::{DeadLetterEnvelope, DoneMessage};
