//! Consumer loop and lifecycle controller.
//!
//! One delivery at a time (prefetch 1), each bounded by a wall-clock
//! timeout. Connection loss and termination signals end the process;
//! the external supervisor restarts it and topology setup re-runs
//! idempotently. In-process reconnection is deliberately not
//! attempted.

use std::sync::Arc;

use futures::StreamExt;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicRejectOptions};
use lapin::{acker::Acker, Connection};
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use remuxd_broker::{
    connect, ensure_topology, publish_dead_letter, publish_done, AmqpChannel, BrokerChannel,
    QueueNames, TopologyMode,
};

use crate::error::{ConsumerError, ConsumerResult};
use crate::processor::{process_delivery, Disposition, ProcessorContext};
use crate::settings::Settings;

/// The running consumer: one connection, one channel, one in-flight
/// delivery.
pub struct Consumer {
    settings: Settings,
    connection: Connection,
    channel: Arc<AmqpChannel>,
    names: QueueNames,
    ctx: Arc<ProcessorContext>,
    consumer_tag: String,
}

impl Consumer {
    /// Connect to the broker and establish the queue topology.
    pub async fn connect(settings: Settings) -> ConsumerResult<Self> {
        let uri = settings.broker.amqp_uri();
        let (connection, channel) = connect(&uri).await?;
        info!(
            host = %settings.broker.host,
            vhost = %settings.broker.vhost,
            "Connected to broker"
        );

        let names = settings.queues.clone();
        let mode = ensure_topology(&channel, &names).await?;
        if mode == TopologyMode::Degraded {
            warn!("Dead-letter routing unavailable; rejected messages rely on explicit dead-letter publishes");
        }

        // One unacknowledged delivery at a time: a stuck remux must not
        // hoard deliveries beyond the timeout window.
        channel.qos(1).await?;

        let ctx = ProcessorContext {
            categories: settings.paths.clone(),
            target_language: settings.worker.target_language.clone(),
        };

        Ok(Self {
            connection,
            channel: Arc::new(channel),
            names,
            ctx: Arc::new(ctx),
            consumer_tag: format!("remuxd-{}", Uuid::new_v4()),
            settings,
        })
    }

    /// Consume until shutdown or connection loss.
    pub async fn run(self) -> ConsumerResult<()> {
        let mut deliveries = self
            .channel
            .consume(&self.names.tasks, &self.consumer_tag)
            .await?;
        info!(queue = %self.names.tasks, "Consumer registered, waiting for messages");

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        let mut liveness = tokio::time::interval(self.settings.worker.liveness_interval());
        liveness.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                delivery = deliveries.next() => {
                    match delivery {
                        Some(Ok(delivery)) => self.handle_delivery(delivery).await,
                        Some(Err(e)) => {
                            error!(error = %e, "Delivery stream failed");
                            return Err(ConsumerError::Broker(e.into()));
                        }
                        None => {
                            error!("Delivery stream closed by broker");
                            return Err(ConsumerError::ConnectionLost);
                        }
                    }
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down");
                    break;
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down");
                    break;
                }
                _ = liveness.tick() => {
                    if !self.connection.status().connected() {
                        error!("Broker connection lost");
                        return Err(ConsumerError::ConnectionLost);
                    }
                }
            }
        }

        if let Err(e) = self.connection.close(200, "shutdown").await {
            warn!(error = %e, "Error closing broker connection");
        }
        info!("Consumer shutdown complete");
        Ok(())
    }

    /// Process one delivery under the configured timeout and apply the
    /// resulting acknowledgment decision.
    async fn handle_delivery(&self, delivery: Delivery) {
        let Delivery { data, acker, .. } = delivery;
        debug!(bytes = data.len(), "Received a message");

        let ctx = Arc::clone(&self.ctx);
        let body = data.clone();
        let worker = tokio::spawn(async move { process_delivery(&ctx, &body).await });

        let timeout = self.settings.worker.task_timeout();
        let disposition = match tokio::time::timeout(timeout, worker).await {
            Ok(Ok(disposition)) => disposition,
            Ok(Err(e)) => {
                error!(error = %e, "Processing task panicked, leaving delivery for redelivery");
                Disposition::Redeliver
            }
            Err(_) => {
                // The in-flight remux subprocess is left to finish on
                // its own; only the delivery is given up on.
                warn!(
                    timeout_secs = timeout.as_secs(),
                    "Processing timed out, rejecting delivery"
                );
                Disposition::DeadLetter {
                    reason: format!("Processing timed out after {}s", timeout.as_secs()),
                }
            }
        };

        self.apply(&data, acker, disposition).await;
    }

    /// Carry out a disposition: publishes first, then the broker-level
    /// ack/reject.
    async fn apply(&self, body: &[u8], acker: Acker, disposition: Disposition) {
        match disposition {
            Disposition::Done { identifier } => {
                if let Err(e) =
                    publish_done(self.channel.as_ref(), &self.names, &identifier).await
                {
                    error!(error = %e, "Failed to publish completion message");
                }
                match acker.ack(BasicAckOptions::default()).await {
                    Ok(()) => info!("Message acknowledged after successful processing"),
                    Err(e) => error!(error = %e, "Failed to acknowledge message"),
                }
            }
            Disposition::Empty => match acker.ack(BasicAckOptions::default()).await {
                Ok(()) => info!("Message acknowledged (no media files to process)"),
                Err(e) => error!(error = %e, "Failed to acknowledge message"),
            },
            Disposition::DeadLetter { reason } => {
                if let Err(e) =
                    publish_dead_letter(self.channel.as_ref(), &self.names, body, &reason).await
                {
                    error!(error = %e, "Failed to publish dead-letter message");
                }
                match acker.reject(BasicRejectOptions { requeue: false }).await {
                    Ok(()) => info!(reason = %reason, "Message rejected to dead-letter queue"),
                    Err(e) => error!(error = %e, "Failed to reject message"),
                }
            }
            Disposition::Redeliver => {
                // Deliberately neither acked nor rejected: the broker
                // redelivers after this consumer releases it.
                info!("Delivery left unacknowledged for broker redelivery");
            }
        }
    }
}
