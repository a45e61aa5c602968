use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    clients::smtp::MailSender,
    composer::{ComposeError, NotificationComposer},
    models::{message::QueueMessage, status::DispatchOutcome},
};

/// Turns one raw queue message into at most one email. Holds no per-message
/// state, so a single dispatcher can serve concurrent deliveries.
pub struct MessageDispatcher {
    composer: NotificationComposer,
    mailer: Arc<dyn MailSender>,
}

impl MessageDispatcher {
    pub fn new(composer: NotificationComposer, mailer: Arc<dyn MailSender>) -> Self {
        Self { composer, mailer }
    }

    /// Never returns an error: decode, routing and send failures are logged
    /// and reported through the outcome.
    pub async fn dispatch(&self, raw_message: &[u8]) -> DispatchOutcome {
        let message = match QueueMessage::from_slice(raw_message) {
            Ok(message) => message,
            Err(reason) => {
                error!(
                    error = %reason,
                    payload_bytes = raw_message.len(),
                    "Failed to decode queue message"
                );
                return DispatchOutcome::DecodeError(reason);
            }
        };

        let action = message.action();
        let request_id = message.request_id().unwrap_or("-");

        info!(
            action = action.unwrap_or("<missing>"),
            request_id,
            "Processing email request"
        );

        let notification = match self.composer.compose(action, &message) {
            Ok(notification) => notification,
            Err(ComposeError::UnknownAction(action)) => {
                warn!(
                    action = action.as_deref().unwrap_or("<missing>"),
                    request_id,
                    "Unknown action, skipping message"
                );
                return DispatchOutcome::UnknownAction(action);
            }
        };

        let Some(to_address) = message.email() else {
            error!(request_id, "Message has no email address, nothing sent");
            return DispatchOutcome::SendFailure("missing recipient email".to_string());
        };

        match self
            .mailer
            .send_email(&to_address, &notification.subject, &notification.body)
            .await
        {
            Ok(()) => {
                info!(
                    to = %to_address,
                    subject = %notification.subject,
                    request_id,
                    "Notification email sent"
                );
                DispatchOutcome::Sent
            }
            Err(e) => {
                error!(
                    to = %to_address,
                    error = %e,
                    request_id,
                    "Failed to send email"
                );
                DispatchOutcome::SendFailure(e.to_string())
            }
        }
    }
}
