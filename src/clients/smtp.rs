use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Transport(String),
}

/// Outbound mail collaborator used by the dispatcher.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send_email(
        &self,
        to_address: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailError>;
}

/// Sends plain-text mail through an authenticated STARTTLS relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Result<Self, MailError> {
        let from = parse_mailbox(&config.smtp_from_email)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_password.clone(),
            ))
            .timeout(Some(config.smtp_timeout()))
            .build();

        info!(
            server = %config.smtp_server,
            port = config.smtp_port,
            "SMTP mailer initialized"
        );

        Ok(Self { transport, from })
    }

    pub async fn test_connection(&self) -> Result<bool, MailError> {
        self.transport
            .test_connection()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send_email(
        &self,
        to_address: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailError> {
        let to = parse_mailbox(to_address)?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Build(e.to_string()))?;

        debug!(to = to_address, subject, "Sending email over SMTP");

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        info!(to = to_address, "Email sent successfully");

        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| {
        MailError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        }
    })
}
