use std::{collections::HashMap, time::Instant};

use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    clients::{rbmq::RabbitMqClient, smtp::SmtpMailer},
    config::Config,
    models::health::{HealthCheckResponse, HealthStatus, ServiceHealth},
};

pub struct HealthChecker {
    config: Config,
}

impl HealthChecker {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn check_all(&self) -> HealthCheckResponse {
        let mut checks = HashMap::new();

        let rabbitmq_health = self.check_rabbitmq().await;
        checks.insert("message_broker".to_string(), rabbitmq_health);

        let smtp_health = self.check_smtp().await;
        checks.insert("smtp".to_string(), smtp_health);

        HealthCheckResponse {
            status: determine_overall_status(&checks),
            timestamp: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            checks,
        }
    }

    async fn check_rabbitmq(&self) -> ServiceHealth {
        let start = Instant::now();

        match RabbitMqClient::connect(&self.config).await {
            Ok(_) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(response_time_ms = elapsed, "RabbitMQ health check passed");
                ServiceHealth::healthy(elapsed)
            }
            Err(e) => {
                warn!(error = %e, "RabbitMQ connection failed");
                ServiceHealth::unhealthy(format!("Connection failed: {}", e))
            }
        }
    }

    async fn check_smtp(&self) -> ServiceHealth {
        let start = Instant::now();

        let mailer = match SmtpMailer::new(&self.config) {
            Ok(mailer) => mailer,
            Err(e) => {
                warn!(error = %e, "SMTP mailer creation failed");
                return ServiceHealth::unhealthy(format!("Mailer creation failed: {}", e));
            }
        };

        match mailer.test_connection().await {
            Ok(true) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(response_time_ms = elapsed, "SMTP health check passed");
                ServiceHealth::healthy(elapsed)
            }
            Ok(false) => {
                warn!("SMTP server did not accept the connection");
                ServiceHealth::unhealthy("Connection rejected".to_string())
            }
            Err(e) => {
                warn!(error = %e, "SMTP connection failed");
                ServiceHealth::unhealthy(format!("Connection failed: {}", e))
            }
        }
    }
}

pub fn determine_overall_status(checks: &HashMap<String, ServiceHealth>) -> HealthStatus {
    let has_unhealthy = checks
        .values()
        .any(|health| health.status == HealthStatus::Unhealthy);

    if has_unhealthy {
        HealthStatus::Unhealthy
    } else {
        HealthStatus::Healthy
    }
}
