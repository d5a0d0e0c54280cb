use std::collections::BTreeMap;

use catalog_kv::KVError;
use reqwest::StatusCode;
use serde_json::Value;

/// Field name to the server's messages for that field.
pub type FieldMessages = BTreeMap<String, Vec<String>>;

/// Everything a catalog call can fail with.
///
/// `Display` is the short user-facing message; [`ApiError::detail`] carries
/// whatever text the server sent along.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized(String),

    #[error("invalid data")]
    InvalidInput(String),

    #[error("invalid data")]
    Validation {
        message: String,
        fields: FieldMessages,
    },

    #[error("not found")]
    NotFound(String),

    #[error("server error")]
    Server { status: u16, message: String },

    #[error("cannot connect")]
    NetworkUnreachable(String),

    #[error("session expired")]
    SessionExpired(String),

    #[error("invalid response")]
    Decode(String),

    #[error("storage: {0}")]
    Storage(#[from] KVError),
}

impl ApiError {
    /// Build the error for a non-2xx response, consuming its body.
    pub async fn from_response(resp: reqwest::Response) -> Self {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Self::from_status(status, &body)
    }

    /// Map a status code and raw body to an error.
    ///
    /// 400 bodies shaped `{"details": {field: [msg]}}` or `{field: [msg]}`
    /// become [`ApiError::Validation`]; a bare `{"error": ".."}` stays
    /// [`ApiError::InvalidInput`].
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let json: Option<Value> = serde_json::from_str(body).ok();
        let message = json
            .as_ref()
            .and_then(message_of)
            .unwrap_or_else(|| body.trim().to_string());

        match status {
            StatusCode::BAD_REQUEST => {
                let fields = json.as_ref().map(fields_of).unwrap_or_default();
                if fields.is_empty() {
                    ApiError::InvalidInput(message)
                } else {
                    ApiError::Validation { message, fields }
                }
            }
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            other => ApiError::Server {
                status: other.as_u16(),
                message,
            },
        }
    }

    /// Server-provided text, if any.
    pub fn detail(&self) -> Option<&str> {
        let text = match self {
            ApiError::Unauthorized(m)
            | ApiError::InvalidInput(m)
            | ApiError::NotFound(m)
            | ApiError::NetworkUnreachable(m)
            | ApiError::SessionExpired(m)
            | ApiError::Decode(m) => m.as_str(),
            ApiError::Validation { message, .. } | ApiError::Server { message, .. } => {
                message.as_str()
            }
            ApiError::Storage(_) => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    /// Per-field messages of a validation failure.
    pub fn field_errors(&self) -> Option<&FieldMessages> {
        match self {
            ApiError::Validation { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// True when the caller must treat the user as signed out.
    pub fn is_session_ending(&self) -> bool {
        matches!(self, ApiError::SessionExpired(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::NetworkUnreachable(e.to_string())
        }
    }
}

fn message_of(json: &Value) -> Option<String> {
    ["error", "detail", "message"]
        .iter()
        .find_map(|k| json.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

fn fields_of(json: &Value) -> FieldMessages {
    let source = match json.get("details") {
        Some(details) => details,
        None => json,
    };
    let Some(obj) = source.as_object() else {
        return FieldMessages::new();
    };

    let mut fields = FieldMessages::new();
    for (name, value) in obj {
        let msgs: Vec<String> = match value {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => continue,
        };
        if !msgs.is_empty() {
            fields.insert(name.clone(), msgs);
        }
    }
    // A top-level `{"error": ".."}` is a message, not a field.
    if std::ptr::eq(source, json) {
        for key in ["error", "detail", "message"] {
            fields.remove(key);
        }
    }
    fields
}
