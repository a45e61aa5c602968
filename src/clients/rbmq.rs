use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties, Consumer,
    options::{
        BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicQosOptions,
        QueueDeclareOptions,
    },
    types::FieldTable,
};
use tracing::{debug, info};

use crate::{
    config::Config,
    models::message::{DeadLetter, QueueMessage},
};

/// Enqueue side of the pipeline, used by the registration endpoint.
#[async_trait]
pub trait QueuePublisher: Send + Sync {
    async fn publish(&self, message: &QueueMessage) -> Result<(), Error>;
}

pub struct RabbitMqClient {
    // Dropping the connection closes the channel.
    _connection: Connection,
    channel: Channel,
    email_queue_name: String,
    failed_queue_name: Option<String>,
}

impl RabbitMqClient {
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        info!("Connecting to RabbitMQ");

        let connection = Connection::connect(&config.rabbitmq_url, ConnectionProperties::default())
            .await
            .map_err(|e| anyhow!("Failed to connect to RabbitMQ: {}", e))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| anyhow!("RabbitMQ channel creation failed: {}", e))?;

        channel
            .basic_qos(config.prefetch_count, BasicQosOptions::default())
            .await
            .map_err(|e| anyhow!("Failed to set up QoS: {}", e))?;

        declare_durable_queue(&channel, &config.email_queue_name).await?;

        if let Some(failed_queue_name) = &config.failed_queue_name {
            declare_durable_queue(&channel, failed_queue_name).await?;
        }

        info!(
            queue = %config.email_queue_name,
            failed_queue = config.failed_queue_name.as_deref().unwrap_or("-"),
            prefetch_count = config.prefetch_count,
            "RabbitMQ channel ready"
        );

        Ok(Self {
            _connection: connection,
            channel,
            email_queue_name: config.email_queue_name.clone(),
            failed_queue_name: config.failed_queue_name.clone(),
        })
    }

    pub fn has_failed_queue(&self) -> bool {
        self.failed_queue_name.is_some()
    }

    pub async fn create_consumer(&self) -> Result<Consumer, Error> {
        let consumer = self
            .channel
            .basic_consume(
                &self.email_queue_name,
                "email_worker",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| anyhow!("Failed to create consumer: {}", e))?;

        info!(queue = %self.email_queue_name, "Consumer created for queue");

        Ok(consumer)
    }

    pub async fn acknowledge(&self, delivery_tag: u64) -> Result<(), Error> {
        self.channel
            .basic_ack(delivery_tag, BasicAckOptions::default())
            .await
            .map_err(|e| anyhow!("Failed to acknowledge message: {}", e))?;

        Ok(())
    }

    pub async fn publish_raw(&self, queue_name: &str, payload: &[u8]) -> Result<(), Error> {
        self.channel
            .basic_publish(
                "",
                queue_name,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default()
                    .with_delivery_mode(2)
                    .with_content_type("application/json".into()),
            )
            .await
            .map_err(|e| anyhow!("Failed to publish to {}: {}", queue_name, e))?;

        Ok(())
    }

    /// No-op when no failed queue is configured.
    pub async fn publish_to_dlq(&self, message: &DeadLetter) -> Result<(), Error> {
        let Some(failed_queue_name) = &self.failed_queue_name else {
            return Ok(());
        };

        let payload = serde_json::to_vec(message)?;
        self.publish_raw(failed_queue_name, &payload).await?;

        debug!(queue = %failed_queue_name, "Dead letter published");

        Ok(())
    }
}

#[async_trait]
impl QueuePublisher for RabbitMqClient {
    async fn publish(&self, message: &QueueMessage) -> Result<(), Error> {
        let payload = message.to_vec()?;
        self.publish_raw(&self.email_queue_name, &payload).await
    }
}

async fn declare_durable_queue(channel: &Channel, queue_name: &str) -> Result<(), Error> {
    channel
        .queue_declare(
            queue_name,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| anyhow!("Failed to declare queue {}: {}", queue_name, e))?;

    Ok(())
}
