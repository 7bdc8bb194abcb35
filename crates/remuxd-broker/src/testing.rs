//! In-memory fake of [`BrokerChannel`] for tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;
use lapin::protocol::{AMQPError, AMQPErrorKind, AMQPHardError, AMQPSoftError};

use crate::error::{BrokerError, BrokerResult};
use crate::gateway::{BrokerChannel, DeadLetterArgs};

/// Observable broker state recorded by the fake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FakeState {
    /// Declared queues and their dead-letter arguments.
    pub queues: BTreeMap<String, Option<DeadLetterArgs>>,
    /// Queues attached to passively.
    pub passive: BTreeSet<String>,
    pub exchanges: BTreeSet<String>,
    /// (queue, exchange, routing key) bindings.
    pub bindings: BTreeSet<(String, String, String)>,
    pub deleted: Vec<String>,
    /// (routing key, body) of every publish.
    pub published: Vec<(String, Vec<u8>)>,
    pub prefetch: Option<u16>,
}

/// Fake channel with primable failure modes.
#[derive(Default)]
pub(crate) struct FakeChannel {
    state: Mutex<FakeState>,
    conflicts: Mutex<BTreeSet<String>>,
    hard_failures: Mutex<BTreeSet<String>>,
    refuse_deletes: Mutex<bool>,
}

impl FakeChannel {
    /// Snapshot of the recorded state.
    pub fn state(&self) -> FakeState {
        self.state.lock().unwrap().clone()
    }

    /// Make the named queue behave as if it exists with different
    /// arguments: declares fail with AMQP 406 until it is deleted.
    pub fn prime_conflict(&self, queue: &str) {
        self.conflicts.lock().unwrap().insert(queue.to_string());
    }

    /// Refuse queue deletion, as a broker does for a non-empty queue.
    pub fn refuse_deletes(&self) {
        *self.refuse_deletes.lock().unwrap() = true;
    }

    /// Fail declares of the named queue with a hard AMQP error.
    pub fn fail_hard_on_declare(&self, queue: &str) {
        self.hard_failures.lock().unwrap().insert(queue.to_string());
    }

    fn precondition_failed(message: &str) -> BrokerError {
        BrokerError::Amqp(lapin::Error::ProtocolError(AMQPError::new(
            AMQPErrorKind::Soft(AMQPSoftError::PRECONDITIONFAILED),
            message.into(),
        )))
    }
}

#[async_trait]
impl BrokerChannel for FakeChannel {
    async fn declare_queue(
        &self,
        name: &str,
        dead_letter: Option<&DeadLetterArgs>,
    ) -> BrokerResult<()> {
        if self.hard_failures.lock().unwrap().contains(name) {
            return Err(BrokerError::Amqp(lapin::Error::ProtocolError(
                AMQPError::new(
                    AMQPErrorKind::Hard(AMQPHardError::INTERNALERROR),
                    "INTERNAL_ERROR".into(),
                ),
            )));
        }
        if self.conflicts.lock().unwrap().contains(name) {
            return Err(Self::precondition_failed(&format!(
                "PRECONDITION_FAILED - inequivalent arg 'x-dead-letter-exchange' for queue '{name}'"
            )));
        }
        self.state
            .lock()
            .unwrap()
            .queues
            .insert(name.to_string(), dead_letter.cloned());
        Ok(())
    }

    async fn declare_queue_passive(&self, name: &str) -> BrokerResult<()> {
        let known = self.state.lock().unwrap().queues.contains_key(name)
            || self.conflicts.lock().unwrap().contains(name);
        if !known {
            return Err(BrokerError::Amqp(lapin::Error::ProtocolError(
                AMQPError::new(
                    AMQPErrorKind::Soft(AMQPSoftError::NOTFOUND),
                    format!("NOT_FOUND - no queue '{name}'").into(),
                ),
            )));
        }
        self.state.lock().unwrap().passive.insert(name.to_string());
        Ok(())
    }

    async fn declare_exchange(&self, name: &str) -> BrokerResult<()> {
        self.state.lock().unwrap().exchanges.insert(name.to_string());
        Ok(())
    }

    async fn bind_queue(&self, queue: &str, exchange: &str, routing_key: &str) -> BrokerResult<()> {
        self.state.lock().unwrap().bindings.insert((
            queue.to_string(),
            exchange.to_string(),
            routing_key.to_string(),
        ));
        Ok(())
    }

    async fn delete_queue_if_empty(&self, name: &str) -> BrokerResult<()> {
        if *self.refuse_deletes.lock().unwrap() {
            return Err(Self::precondition_failed(&format!(
                "PRECONDITION_FAILED - queue '{name}' not empty"
            )));
        }
        self.conflicts.lock().unwrap().remove(name);
        let mut state = self.state.lock().unwrap();
        state.queues.remove(name);
        state.deleted.push(name.to_string());
        Ok(())
    }

    async fn publish(&self, routing_key: &str, body: &[u8]) -> BrokerResult<()> {
        self.state
            .lock()
            .unwrap()
            .published
            .push((routing_key.to_string(), body.to_vec()));
        Ok(())
    }

    async fn qos(&self, prefetch: u16) -> BrokerResult<()> {
        self.state.lock().unwrap().prefetch = Some(prefetch);
        Ok(())
    }
}
