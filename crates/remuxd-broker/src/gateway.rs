//! Thin capability wrapper over an AMQP channel.

use async_trait::async_trait;
use lapin::options::{
    BasicConsumeOptions, BasicPublishOptions, BasicQosOptions, ExchangeDeclareOptions,
    QueueBindOptions, QueueDeclareOptions, QueueDeleteOptions,
};
use lapin::types::{AMQPValue, FieldTable};
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties, Consumer, ExchangeKind,
};
use tracing::debug;

use crate::error::BrokerResult;

/// Dead-letter wiring for a queue declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetterArgs {
    pub exchange: String,
    pub routing_key: String,
}

/// The channel verbs this consumer needs from the broker.
///
/// Everything is durable and JSON-bodied by convention; the trait
/// exists so topology and publishers can be exercised against an
/// in-memory fake.
#[async_trait]
pub trait BrokerChannel: Send + Sync {
    /// Declare a durable queue, optionally wired to a dead-letter
    /// exchange.
    async fn declare_queue(
        &self,
        name: &str,
        dead_letter: Option<&DeadLetterArgs>,
    ) -> BrokerResult<()>;

    /// Passively attach to an existing queue without asserting its
    /// arguments.
    async fn declare_queue_passive(&self, name: &str) -> BrokerResult<()>;

    /// Declare a durable direct exchange.
    async fn declare_exchange(&self, name: &str) -> BrokerResult<()>;

    /// Bind a queue to an exchange under a routing key.
    async fn bind_queue(&self, queue: &str, exchange: &str, routing_key: &str) -> BrokerResult<()>;

    /// Delete a queue, failing if it still holds messages.
    async fn delete_queue_if_empty(&self, name: &str) -> BrokerResult<()>;

    /// Publish a persistent JSON body to a queue via the default
    /// exchange.
    async fn publish(&self, routing_key: &str, body: &[u8]) -> BrokerResult<()>;

    /// Limit unacknowledged deliveries held by this channel.
    async fn qos(&self, prefetch: u16) -> BrokerResult<()>;
}

/// Connect to the broker and open one channel.
pub async fn connect(uri: &str) -> BrokerResult<(Connection, AmqpChannel)> {
    let connection = Connection::connect(uri, ConnectionProperties::default()).await?;
    let channel = connection.create_channel().await?;
    Ok((connection, AmqpChannel::new(channel)))
}

/// Live AMQP implementation of [`BrokerChannel`].
pub struct AmqpChannel {
    channel: Channel,
}

impl AmqpChannel {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }

    /// Start consuming from a queue with manual acknowledgment.
    pub async fn consume(&self, queue: &str, consumer_tag: &str) -> BrokerResult<Consumer> {
        let consumer = self
            .channel
            .basic_consume(
                queue,
                consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;
        Ok(consumer)
    }
}

#[async_trait]
impl BrokerChannel for AmqpChannel {
    async fn declare_queue(
        &self,
        name: &str,
        dead_letter: Option<&DeadLetterArgs>,
    ) -> BrokerResult<()> {
        let mut arguments = FieldTable::default();
        if let Some(dl) = dead_letter {
            arguments.insert(
                "x-dead-letter-exchange".into(),
                AMQPValue::LongString(dl.exchange.clone().into()),
            );
            arguments.insert(
                "x-dead-letter-routing-key".into(),
                AMQPValue::LongString(dl.routing_key.clone().into()),
            );
        }

        self.channel
            .queue_declare(
                name,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                arguments,
            )
            .await?;
        debug!(queue = name, "Queue declared");
        Ok(())
    }

    async fn declare_queue_passive(&self, name: &str) -> BrokerResult<()> {
        self.channel
            .queue_declare(
                name,
                QueueDeclareOptions {
                    passive: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        Ok(())
    }

    async fn declare_exchange(&self, name: &str) -> BrokerResult<()> {
        self.channel
            .exchange_declare(
                name,
                ExchangeKind::Direct,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        Ok(())
    }

    async fn bind_queue(&self, queue: &str, exchange: &str, routing_key: &str) -> BrokerResult<()> {
        self.channel
            .queue_bind(
                queue,
                exchange,
                routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;
        Ok(())
    }

    async fn delete_queue_if_empty(&self, name: &str) -> BrokerResult<()> {
        self.channel
            .queue_delete(
                name,
                QueueDeleteOptions {
                    if_empty: true,
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }

    async fn publish(&self, routing_key: &str, body: &[u8]) -> BrokerResult<()> {
        let confirm = self
            .channel
            .basic_publish(
                "",
                routing_key,
                BasicPublishOptions::default(),
                body,
                BasicProperties::default()
                    .with_content_type("application/json".into())
                    .with_delivery_mode(2),
            )
            .await?;
        confirm.await?;
        Ok(())
    }

    async fn qos(&self, prefetch: u16) -> BrokerResult<()> {
        self.channel
            .basic_qos(prefetch, BasicQosOptions::default())
            .await?;
        Ok(())
    }
}
