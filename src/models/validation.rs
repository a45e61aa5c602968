use serde_json::Value;
use thiserror::Error;

use crate::models::registration::RegistrationRequest;

pub const REQUIRED_REGISTRATION_FIELDS: [&str; 5] =
    ["username", "email", "password", "first_name", "last_name"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing fields: {}", .missing_fields.join(", "))]
pub struct ValidationFailure {
    pub missing_fields: Vec<&'static str>,
}

/// Checks the registration body for the required fields, in order. A field
/// counts as present when its key exists; non-string values are kept as
/// their JSON text.
pub fn validate_registration(body: &Value) -> Result<RegistrationRequest, ValidationFailure> {
    let object = body.as_object();

    let missing_fields: Vec<&'static str> = REQUIRED_REGISTRATION_FIELDS
        .iter()
        .copied()
        .filter(|field| object.is_none_or(|o| !o.contains_key(*field)))
        .collect();

    if !missing_fields.is_empty() {
        return Err(ValidationFailure { missing_fields });
    }

    let text = |field: &str| match &body[field] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    Ok(RegistrationRequest {
        username: text("username"),
        email: text("email"),
        password: text("password"),
        first_name: text("first_name"),
        last_name: text("last_name"),
    })
}
