use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::registration::RegistrationRequest;

/// A decoded queue message: a JSON object carrying an `action` discriminator
/// plus action-specific fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueMessage {
    fields: Map<String, Value>,
}

impl QueueMessage {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Builds the message the registration endpoint enqueues. The password is
    /// never put on the queue.
    pub fn signup(request: &RegistrationRequest, request_id: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("action".to_string(), Value::from("signup"));
        fields.insert("request_id".to_string(), Value::from(request_id));
        fields.insert("email".to_string(), Value::from(request.email.as_str()));
        fields.insert(
            "username".to_string(),
            Value::from(request.username.as_str()),
        );
        fields.insert(
            "first_name".to_string(),
            Value::from(request.first_name.as_str()),
        );
        fields.insert(
            "last_name".to_string(),
            Value::from(request.last_name.as_str()),
        );

        Self { fields }
    }

    pub fn from_slice(raw: &[u8]) -> Result<Self, String> {
        let text = std::str::from_utf8(raw).map_err(|e| format!("invalid UTF-8: {}", e))?;

        let value: Value =
            serde_json::from_str(text).map_err(|e| format!("invalid JSON: {}", e))?;

        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            )),
        }
    }

    /// The `action` discriminator. A non-string value counts as absent.
    pub fn action(&self) -> Option<&str> {
        self.fields.get("action").and_then(Value::as_str)
    }

    pub fn email(&self) -> Option<String> {
        self.field("email").filter(|email| !email.trim().is_empty())
    }

    pub fn request_id(&self) -> Option<&str> {
        self.fields.get("request_id").and_then(Value::as_str)
    }

    /// Renders a field as text. Strings are taken verbatim, numbers and
    /// booleans as their JSON text; null, arrays and objects are absent.
    pub fn field(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.fields)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Record published to the failed queue when a delivery is dead-lettered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetter {
    pub original_payload: String,
    pub failure_reason: String,
    pub failed_at: String,
}
