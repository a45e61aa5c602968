use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use email_service::{
    api::{AppState, run_api_server},
    clients::{health::HealthChecker, rbmq::RabbitMqClient, smtp::SmtpMailer},
    composer::NotificationComposer,
    config::Config,
    dispatcher::MessageDispatcher,
    worker::run_worker,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load()?;

    info!("Configuration validated");

    let mailer = SmtpMailer::new(&config).map_err(|e| anyhow!("SMTP setup failed: {}", e))?;
    let dispatcher = Arc::new(MessageDispatcher::new(
        NotificationComposer::new(config.confirmation_token_length),
        Arc::new(mailer),
    ));

    let rabbitmq = Arc::new(RabbitMqClient::connect(&config).await?);

    let state = Arc::new(AppState::new(
        rabbitmq.clone(),
        HealthChecker::new(config.clone()),
    ));

    tokio::select! {
        result = run_api_server(config.server_port, state) => {
            if let Err(e) = &result {
                error!(error = %e, "API server stopped");
            }
            result
        }
        result = run_worker(&config, rabbitmq, dispatcher) => {
            if let Err(e) = &result {
                error!(error = %e, "Email worker stopped");
            }
            result
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            Ok(())
        }
    }
}
