use std::{sync::Arc, time::Duration};

use anyhow::{Result, anyhow};
use email_service::{
    clients::rbmq::{QueuePublisher, RabbitMqClient},
    config::Config,
    models::message::{DeadLetter, QueueMessage},
    worker::run_worker,
};
use futures_util::StreamExt;
use lapin::{
    Connection, ConnectionProperties,
    options::{BasicAckOptions, BasicConsumeOptions},
    types::FieldTable,
};
use serde_json::json;
use testcontainers::{
    ContainerAsync, GenericImage,
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
};
use tokio::time::{sleep, timeout};

use crate::common::{RecordingMailer, base_vars, dispatcher_with};

async fn start_rabbitmq() -> Result<(ContainerAsync<GenericImage>, Config)> {
    let container = GenericImage::new("rabbitmq", "3.13-alpine")
        .with_exposed_port(5672.tcp())
        .with_wait_for(WaitFor::message_on_stdout("Server startup complete"))
        .start()
        .await?;

    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5672.tcp()).await?;

    let mut vars = base_vars();
    vars.retain(|(k, _)| k != "RABBITMQ_URL");
    vars.push((
        "RABBITMQ_URL".to_string(),
        format!("amqp://guest:guest@{}:{}/%2f", host, port),
    ));
    vars.push(("FAILED_QUEUE_NAME".to_string(), "emailqueue.failed".to_string()));

    Ok((container, Config::from_vars(vars)?))
}

async fn consume_one(config: &Config, queue_name: &str) -> Result<Vec<u8>> {
    let connection =
        Connection::connect(&config.rabbitmq_url, ConnectionProperties::default()).await?;
    let channel = connection.create_channel().await?;

    let mut consumer = channel
        .basic_consume(
            queue_name,
            "test_consumer",
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;

    let delivery = timeout(Duration::from_secs(10), consumer.next())
        .await?
        .ok_or_else(|| anyhow!("No message in {}", queue_name))??;

    channel
        .basic_ack(delivery.delivery_tag, BasicAckOptions::default())
        .await?;

    Ok(delivery.data)
}

/// Test: Published messages arrive on the email queue as plain JSON
#[tokio::test]
#[ignore = "requires docker"]
async fn test_published_message_is_plain_json() -> Result<()> {
    let (_container, config) = start_rabbitmq().await?;
    let rabbitmq = RabbitMqClient::connect(&config).await?;

    let mut message = QueueMessage::default();
    message.insert("action", "login");
    message.insert("email", "a@example.com");
    message.insert("login_ip", "10.1.2.3");

    rabbitmq.publish(&message).await?;

    let data = consume_one(&config, &config.email_queue_name).await?;
    let received: serde_json::Value = serde_json::from_slice(&data)?;

    assert_eq!(received["action"], json!("login"));
    assert_eq!(received["login_ip"], json!("10.1.2.3"));

    Ok(())
}

/// Test: Dead letters carry the original payload and reason
#[tokio::test]
#[ignore = "requires docker"]
async fn test_dead_letter_round_trip() -> Result<()> {
    let (_container, config) = start_rabbitmq().await?;
    let rabbitmq = RabbitMqClient::connect(&config).await?;

    let dead_letter = DeadLetter {
        original_payload: "{\"action\":".to_string(),
        failure_reason: "decode error: EOF".to_string(),
        failed_at: "2024-01-01T00:00:00.000Z".to_string(),
    };

    rabbitmq.publish_to_dlq(&dead_letter).await?;

    let data = consume_one(&config, "emailqueue.failed").await?;
    let received: DeadLetter = serde_json::from_slice(&data)?;

    assert_eq!(received.original_payload, dead_letter.original_payload);
    assert_eq!(received.failure_reason, dead_letter.failure_reason);

    Ok(())
}

/// Test: Worker sends mail for good messages and dead-letters undecodable ones
#[tokio::test]
#[ignore = "requires docker"]
async fn test_worker_processes_queue() -> Result<()> {
    let (_container, config) = start_rabbitmq().await?;
    let rabbitmq = Arc::new(RabbitMqClient::connect(&config).await?);

    let mailer = Arc::new(RecordingMailer::default());
    let dispatcher = Arc::new(dispatcher_with(Arc::clone(&mailer)));

    let worker_config = config.clone();
    let worker_rabbitmq = Arc::clone(&rabbitmq);
    let worker = tokio::spawn(async move {
        run_worker(&worker_config, worker_rabbitmq, dispatcher).await
    });

    let mut signup = QueueMessage::default();
    signup.insert("action", "signup");
    signup.insert("email", "a@example.com");
    signup.insert("first_name", "Ada");
    signup.insert("last_name", "Lovelace");
    signup.insert("username", "ada");

    rabbitmq.publish(&signup).await?;
    rabbitmq
        .publish_raw(&config.email_queue_name, b"not json")
        .await?;

    for _ in 0..50 {
        if !mailer.sent().is_empty() {
            break;
        }
        sleep(Duration::from_millis(200)).await;
    }

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@example.com");

    let data = consume_one(&config, "emailqueue.failed").await?;
    let dead_letter: DeadLetter = serde_json::from_slice(&data)?;
    assert_eq!(dead_letter.original_payload, "not json");

    worker.abort();

    Ok(())
}
