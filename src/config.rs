use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub rabbitmq_url: String,
    #[serde(default = "default_email_queue_name")]
    pub email_queue_name: String,
    #[serde(default)]
    pub failed_queue_name: Option<String>,
    #[serde(default = "default_prefetch_count")]
    pub prefetch_count: u16,

    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
    pub smtp_from_email: String,
    #[serde(default = "default_smtp_timeout_seconds")]
    pub smtp_timeout_seconds: u64,

    #[serde(default = "default_confirmation_token_length")]
    pub confirmation_token_length: usize,

    #[serde(default = "default_worker_concurrency")]
    pub worker_concurrency: usize,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

fn default_email_queue_name() -> String {
    "emailqueue".to_string()
}

fn default_prefetch_count() -> u16 {
    10
}

fn default_smtp_timeout_seconds() -> u64 {
    30
}

fn default_confirmation_token_length() -> usize {
    6
}

fn default_worker_concurrency() -> usize {
    4
}

fn default_server_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Self>(vars)
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;

        if config.confirmation_token_length == 0 {
            return Err(anyhow!("CONFIRMATION_TOKEN_LENGTH must be greater than zero"));
        }

        if config.worker_concurrency == 0 {
            return Err(anyhow!("WORKER_CONCURRENCY must be greater than zero"));
        }

        if config
            .failed_queue_name
            .as_deref()
            .is_some_and(|name| name == config.email_queue_name)
        {
            return Err(anyhow!("FAILED_QUEUE_NAME must differ from EMAIL_QUEUE_NAME"));
        }

        Ok(config)
    }

    pub fn smtp_timeout(&self) -> Duration {
        Duration::from_secs(self.smtp_timeout_seconds)
    }
}
