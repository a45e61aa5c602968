use std::fmt::{Display, Formatter, Result};

/// Recognized values of the `action` discriminator on a queue message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Signup,
    Login,
    Logout,
    Reset,
    Confirm,
    Notify,
    DeletedUser,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::Signup,
        ActionKind::Login,
        ActionKind::Logout,
        ActionKind::Reset,
        ActionKind::Confirm,
        ActionKind::Notify,
        ActionKind::DeletedUser,
    ];

    /// Exact match only. Case variants and prefixes are not recognized.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "signup" => Some(ActionKind::Signup),
            "login" => Some(ActionKind::Login),
            "logout" => Some(ActionKind::Logout),
            "reset" => Some(ActionKind::Reset),
            "confirm" => Some(ActionKind::Confirm),
            "notify" => Some(ActionKind::Notify),
            "deleted_user" => Some(ActionKind::DeletedUser),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::Signup => "signup",
            ActionKind::Login => "login",
            ActionKind::Logout => "logout",
            ActionKind::Reset => "reset",
            ActionKind::Confirm => "confirm",
            ActionKind::Notify => "notify",
            ActionKind::DeletedUser => "deleted_user",
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            ActionKind::Signup => "Welcome to Our Platform!",
            ActionKind::Login => "Account Login Notification",
            ActionKind::Logout => "Logout Notification - Your Account",
            ActionKind::Reset => "Password Reset Request",
            ActionKind::Confirm => "Registration Confirmation",
            ActionKind::Notify => "Important Notification",
            ActionKind::DeletedUser => "Account Deletion Confirmation",
        }
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.as_str())
    }
}
