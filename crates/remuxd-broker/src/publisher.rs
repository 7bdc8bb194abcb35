//! Done and dead-letter publishers.

use tracing::info;

use remuxd_models::{DeadLetterEnvelope, DoneMessage};

use crate::error::BrokerResult;
use crate::gateway::BrokerChannel;
use crate::topology::QueueNames;

/// Publish the completion message for a work item.
///
/// One message per work item, not per file.
pub async fn publish_done(
    channel: &dyn BrokerChannel,
    names: &QueueNames,
    identifier: &str,
) -> BrokerResult<()> {
    let body = serde_json::to_vec(&DoneMessage::new(identifier))?;
    channel.publish(&names.done, &body).await?;
    info!(filename = identifier, queue = %names.done, "Published completion message");
    Ok(())
}

/// Wrap a failed payload in a dead-letter envelope and publish it to
/// the DLQ.
///
/// The DLQ is re-declared first so the publish cannot be lost to a
/// missing queue, even when topology setup ran degraded.
pub async fn publish_dead_letter(
    channel: &dyn BrokerChannel,
    names: &QueueNames,
    payload: &[u8],
    reason: &str,
) -> BrokerResult<()> {
    let body = serde_json::to_vec(&DeadLetterEnvelope::new(payload, reason))?;

    channel.declare_queue(&names.dead_letter, None).await?;
    channel.publish(&names.dead_letter, &body).await?;
    info!(reason, queue = %names.dead_letter, "Published dead-letter message");
    Ok(())
}
