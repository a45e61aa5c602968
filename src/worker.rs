use std::sync::Arc;

use anyhow::{Error, Result};
use chrono::{SecondsFormat, Utc};
use futures_util::StreamExt;
use tracing::{debug, error, info, warn};

use crate::{
    clients::rbmq::RabbitMqClient,
    config::Config,
    dispatcher::MessageDispatcher,
    models::{message::DeadLetter, status::DispatchOutcome},
};

/// Consumes the email queue until the consumer stream ends. Every delivery is
/// acknowledged exactly once whatever its outcome; failures that warrant it
/// are copied to the failed queue first.
pub async fn run_worker(
    config: &Config,
    rabbitmq: Arc<RabbitMqClient>,
    dispatcher: Arc<MessageDispatcher>,
) -> Result<(), Error> {
    let consumer = rabbitmq.create_consumer().await?;

    info!(
        concurrency = config.worker_concurrency,
        dead_lettering = rabbitmq.has_failed_queue(),
        "Email worker started"
    );

    consumer
        .for_each_concurrent(config.worker_concurrency, |delivery| {
            let rabbitmq = Arc::clone(&rabbitmq);
            let dispatcher = Arc::clone(&dispatcher);

            async move {
                match delivery {
                    Ok(delivery) => {
                        process_delivery(
                            &rabbitmq,
                            &dispatcher,
                            &delivery.data,
                            delivery.delivery_tag,
                        )
                        .await
                    }
                    Err(e) => error!(error = %e, "Failed to receive delivery"),
                }
            }
        })
        .await;

    warn!("Consumer stream ended, email worker stopping");

    Ok(())
}

async fn process_delivery(
    rabbitmq: &RabbitMqClient,
    dispatcher: &MessageDispatcher,
    data: &[u8],
    delivery_tag: u64,
) {
    let outcome = dispatcher.dispatch(data).await;

    debug!(delivery_tag, outcome = %outcome, "Delivery dispatched");

    if rabbitmq.has_failed_queue() {
        if let Some(dead_letter) = dead_letter_for(&outcome, data) {
            if let Err(e) = rabbitmq.publish_to_dlq(&dead_letter).await {
                error!(delivery_tag, error = %e, "Failed to publish dead letter");
            }
        }
    }

    if let Err(e) = rabbitmq.acknowledge(delivery_tag).await {
        error!(delivery_tag, error = %e, "Failed to acknowledge delivery");
    }
}

/// Dead-letter record for outcomes that warrant one.
pub fn dead_letter_for(outcome: &DispatchOutcome, raw_message: &[u8]) -> Option<DeadLetter> {
    if !outcome.should_dead_letter() {
        return None;
    }

    Some(DeadLetter {
        original_payload: String::from_utf8_lossy(raw_message).into_owned(),
        failure_reason: outcome.failure_reason()?,
        failed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
