use std::fmt::{Display, Formatter, Result};

/// Result of dispatching a single queue message. The dispatcher never fails;
/// every failure mode is reported here instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    DecodeError(String),
    UnknownAction(Option<String>),
    SendFailure(String),
}

impl DispatchOutcome {
    /// Decode and send failures go to the failed queue, when one is
    /// configured. Unknown actions are dropped.
    pub fn should_dead_letter(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::DecodeError(_) | DispatchOutcome::SendFailure(_)
        )
    }

    pub fn failure_reason(&self) -> Option<String> {
        match self {
            DispatchOutcome::Sent => None,
            DispatchOutcome::DecodeError(reason) => Some(format!("decode error: {}", reason)),
            DispatchOutcome::UnknownAction(action) => Some(format!(
                "unknown action: {}",
                action.as_deref().unwrap_or("<missing>")
            )),
            DispatchOutcome::SendFailure(reason) => Some(format!("send failure: {}", reason)),
        }
    }
}

impl Display for DispatchOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            DispatchOutcome::Sent => write!(f, "sent"),
            DispatchOutcome::DecodeError(_) => write!(f, "decode_error"),
            DispatchOutcome::UnknownAction(_) => write!(f, "unknown_action"),
            DispatchOutcome::SendFailure(_) => write!(f, "send_failure"),
        }
    }
}
