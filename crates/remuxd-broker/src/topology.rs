//! Idempotent queue topology setup.

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::BrokerResult;
use crate::gateway::{BrokerChannel, DeadLetterArgs};

/// Names of the queues and the dead-letter exchange.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueueNames {
    /// Main task queue consumed by this process.
    pub tasks: String,
    /// Completion queue.
    pub done: String,
    /// Dead-letter queue; also the dead-letter routing key.
    pub dead_letter: String,
    /// Dead-letter exchange.
    pub dead_letter_exchange: String,
}

impl Default for QueueNames {
    fn default() -> Self {
        Self {
            tasks: "remux.tasks".to_string(),
            done: "remux.done".to_string(),
            dead_letter: "remux.tasks_DLQ".to_string(),
            dead_letter_exchange: "dlx".to_string(),
        }
    }
}

/// How the main task queue ended up wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyMode {
    /// Rejected messages route to the DLQ through the dead-letter
    /// exchange.
    DeadLetterRouted,
    /// Attached to a pre-existing queue without dead-letter arguments;
    /// rejected messages rely on explicit dead-letter publishes.
    Degraded,
}

/// Establish the task queue, dead-letter wiring, and done queue.
///
/// Re-running against an already-correct broker is a no-op. A task
/// queue that exists with different arguments is deleted (when empty)
/// and redeclared; when deletion is refused the consumer attaches
/// passively and runs degraded rather than crash-looping.
pub async fn ensure_topology(
    channel: &dyn BrokerChannel,
    names: &QueueNames,
) -> BrokerResult<TopologyMode> {
    channel.declare_exchange(&names.dead_letter_exchange).await?;

    let dead_letter = DeadLetterArgs {
        exchange: names.dead_letter_exchange.clone(),
        routing_key: names.dead_letter.clone(),
    };

    let mode = match channel.declare_queue(&names.tasks, Some(&dead_letter)).await {
        Ok(()) => {
            info!(queue = %names.tasks, "Task queue declared with dead-letter routing");
            TopologyMode::DeadLetterRouted
        }
        Err(e) if e.is_config_conflict() => {
            warn!(
                queue = %names.tasks,
                "Task queue exists with different arguments, deleting and redeclaring"
            );
            match channel.delete_queue_if_empty(&names.tasks).await {
                Ok(()) => {
                    channel.declare_queue(&names.tasks, Some(&dead_letter)).await?;
                    info!(queue = %names.tasks, "Task queue recreated with dead-letter routing");
                    TopologyMode::DeadLetterRouted
                }
                Err(delete_err) => {
                    warn!(
                        queue = %names.tasks,
                        error = %delete_err,
                        "Could not delete existing task queue, attaching without dead-letter routing"
                    );
                    channel.declare_queue_passive(&names.tasks).await?;
                    TopologyMode::Degraded
                }
            }
        }
        Err(e) => return Err(e),
    };

    channel.declare_queue(&names.dead_letter, None).await?;
    channel
        .bind_queue(
            &names.dead_letter,
            &names.dead_letter_exchange,
            &names.dead_letter,
        )
        .await?;

    channel.declare_queue(&names.done, None).await?;

    Ok(mode)
}
