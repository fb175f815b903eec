//! Change Event Models
//!
//! Directus webhook bodies, the Slack destination they are relayed to, and the
//! outbound message payload.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Audit fields Directus adds to every webhook body.
pub const ID_FIELD: &str = "id";
pub const MODIFIED_BY_FIELD: &str = "modified_by";
pub const MODIFIED_ON_FIELD: &str = "modified_on";

/// Primary key of the changed record. Directus uses either strings or numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordId {
    Number(serde_json::Number),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A normalized create/update/delete notification.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub record_id: RecordId,
    pub modified_by: u64,
    pub modified_on: String,
    /// Every body field except the audit fields, sorted by name
    pub changed_fields: Map<String, Value>,
    pub object_type_name: String,
}

impl ChangeEvent {
    /// Decodes a webhook body and splits the audit fields from the changed data.
    pub fn parse(object_type_name: &str, body: &[u8]) -> Result<Self, ApiError> {
        let object_type_name = object_type_name.trim();
        if object_type_name.is_empty() {
            return Err(ApiError::Validation("empty object type name".to_string()));
        }

        let mut fields = match serde_json::from_slice::<Value>(body)? {
            Value::Object(map) => map,
            other => {
                return Err(ApiError::Validation(format!(
                    "expected a JSON object body, got {}",
                    json_kind(&other)
                )))
            }
        };

        let record_id = match fields.remove(ID_FIELD) {
            Some(Value::Number(n)) => RecordId::Number(n),
            Some(Value::String(s)) => RecordId::Text(s),
            Some(other) => {
                return Err(ApiError::Validation(format!(
                    "`{}` must be a string or number, got {}",
                    ID_FIELD,
                    json_kind(&other)
                )))
            }
            None => return Err(missing(ID_FIELD)),
        };

        let modified_by = match fields.remove(MODIFIED_BY_FIELD) {
            Some(Value::Number(n)) => n.as_u64().ok_or_else(|| {
                ApiError::Validation(format!(
                    "`{}` must be a non-negative integer, got {}",
                    MODIFIED_BY_FIELD, n
                ))
            })?,
            Some(other) => {
                return Err(ApiError::Validation(format!(
                    "`{}` must be an integer, got {}",
                    MODIFIED_BY_FIELD,
                    json_kind(&other)
                )))
            }
            None => return Err(missing(MODIFIED_BY_FIELD)),
        };

        let modified_on = match fields.remove(MODIFIED_ON_FIELD) {
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(ApiError::Validation(format!(
                    "`{}` must be a string, got {}",
                    MODIFIED_ON_FIELD,
                    json_kind(&other)
                )))
            }
            None => return Err(missing(MODIFIED_ON_FIELD)),
        };

        Ok(ChangeEvent {
            record_id,
            modified_by,
            modified_on,
            changed_fields: fields,
            object_type_name: object_type_name.to_string(),
        })
    }
}

fn missing(field: &str) -> ApiError {
    ApiError::Validation(format!("missing field `{}`", field))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Secret three-segment path of a Slack incoming webhook, e.g. `T000/B000/XXXX`.
#[derive(Clone, PartialEq)]
pub struct RelayTarget {
    secret_path: String,
}

impl RelayTarget {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let secret_path = raw.trim();
        if secret_path.is_empty() {
            return Err(ApiError::Validation("empty Slack URL path".to_string()));
        }

        let segments: Vec<&str> = secret_path.split('/').collect();
        if segments.len() != 3 {
            return Err(ApiError::Validation(format!(
                "Slack URL path must have 3 segments, got {}",
                segments.len()
            )));
        }
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(ApiError::Validation(
                "Slack URL path contains an empty segment".to_string(),
            ));
        }

        Ok(RelayTarget {
            secret_path: secret_path.to_string(),
        })
    }

    pub fn secret_path(&self) -> &str {
        &self.secret_path
    }

    /// Full destination URL below the given webhook base.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.secret_path)
    }
}

// The path is a credential; keep it out of logs.
impl std::fmt::Debug for RelayTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayTarget")
            .field("secret_path", &"[REDACTED]")
            .finish()
    }
}

/// Body of an incoming-webhook call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutboundMessage {
    pub text: String,
}
