//! Maps an action and its message fields to an email subject and body.
//!
//! Composition is pure apart from the random confirmation token drawn for
//! `signup`. A recognized action always composes, however incomplete the
//! payload is: absent fields take their entry from [`FIELD_DEFAULTS`] or
//! render as an empty string.

use thiserror::Error;

use crate::{
    models::{action::ActionKind, message::QueueMessage, notification::ComposedNotification},
    utils::{DEFAULT_TOKEN_LENGTH, generate_token},
};

/// Placeholders for absent fields. Fields not listed here render empty.
pub const FIELD_DEFAULTS: &[(&str, &str)] = &[
    ("login_ip", "Unknown IP"),
    ("login_time", "Unknown time"),
    ("logout_ip", "Unknown IP"),
];

const SIGN_OFF: &str = "Best regards,\nThe Support Team";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("unknown action: {}", .0.as_deref().unwrap_or("<missing>"))]
    UnknownAction(Option<String>),
}

#[derive(Debug, Clone)]
pub struct NotificationComposer {
    token_length: usize,
}

impl Default for NotificationComposer {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_LENGTH)
    }
}

impl NotificationComposer {
    pub fn new(token_length: usize) -> Self {
        Self { token_length }
    }

    pub fn token_length(&self) -> usize {
        self.token_length
    }

    pub fn compose(
        &self,
        action: Option<&str>,
        payload: &QueueMessage,
    ) -> Result<ComposedNotification, ComposeError> {
        let kind = action
            .and_then(ActionKind::parse)
            .ok_or_else(|| ComposeError::UnknownAction(action.map(str::to_string)))?;

        Ok(self.compose_kind(kind, payload))
    }

    pub fn compose_kind(&self, kind: ActionKind, payload: &QueueMessage) -> ComposedNotification {
        let first_name = field(payload, "first_name");
        let last_name = field(payload, "last_name");
        let username = field(payload, "username");
        let greeting = format!("Dear {} {},", first_name, last_name);

        let message = match kind {
            ActionKind::Signup => {
                let token = generate_token(self.token_length);
                format!(
                    "Thank you for signing up! Your account has been created successfully.\n\n\
                     Your username is {username}.\n\n\
                     Your confirmation token is: {token}\n\n\
                     Please use this token to confirm your registration."
                )
            }
            ActionKind::Login => {
                let login_time = field(payload, "login_time");
                let login_ip = field(payload, "login_ip");
                format!(
                    "We detected a login to your account ({username}).\n\n\
                     Login time: {login_time}\n\
                     IP address: {login_ip}\n\n\
                     If this was you, no further action is needed. If you did not \
                     initiate this login, please reset your password immediately \
                     and contact our support team."
                )
            }
            ActionKind::Logout => {
                let logout_time = field(payload, "logout_time");
                let logout_ip = field(payload, "logout_ip");
                format!(
                    "Your account ({username}) was logged out.\n\n\
                     Logout time: {logout_time}\n\
                     IP address: {logout_ip}\n\n\
                     If you did not log out yourself, we recommend that you reset \
                     your password as soon as possible."
                )
            }
            ActionKind::Reset => {
                let reset_link = field(payload, "reset_link");
                format!(
                    "We received a request to reset the password for your account \
                     ({username}).\n\n\
                     You can reset your password using the link below:\n\
                     {reset_link}\n\n\
                     If you did not request a password reset, you can safely ignore \
                     this email."
                )
            }
            ActionKind::Confirm => format!(
                "Your registration has been confirmed. You are now an active member \
                 of our platform.\n\n\
                 Your username is {username}."
            ),
            ActionKind::Notify => {
                let notification_message = field(payload, "notification_message");
                format!("You have a new notification:\n\n{notification_message}")
            }
            ActionKind::DeletedUser => {
                let deletion_time = field(payload, "deletion_time");
                format!(
                    "Your account ({username}) was deleted on {deletion_time}.\n\n\
                     All of your personal data has been permanently removed from our \
                     systems. We are sorry to see you go."
                )
            }
        };

        ComposedNotification {
            subject: kind.subject().to_string(),
            body: format!("{greeting}\n\n{message}\n\n{SIGN_OFF}"),
        }
    }
}

/// Free-function form using the default token length.
pub fn compose(
    action: Option<&str>,
    payload: &QueueMessage,
) -> Result<ComposedNotification, ComposeError> {
    NotificationComposer::default().compose(action, payload)
}

fn field(payload: &QueueMessage, name: &str) -> String {
    payload.field(name).unwrap_or_else(|| {
        FIELD_DEFAULTS
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, default)| default.to_string())
            .unwrap_or_default()
    })
}
