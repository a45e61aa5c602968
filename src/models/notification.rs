use serde::Serialize;

/// Subject and plain-text body produced by the composer for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedNotification {
    pub subject: String,
    pub body: String,
}
