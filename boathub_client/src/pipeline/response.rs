use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::ApiError;

/// How the pipeline reacts to a response.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Success,
    Unauthorized,
    TokenRejected(String),
    Forbidden(String),
    Failed { status: u16, message: String },
}

pub(crate) fn classify(status: StatusCode, body: &[u8]) -> Outcome {
    if status.is_success() {
        return Outcome::Success;
    }

    match status {
        StatusCode::UNAUTHORIZED => Outcome::Unauthorized,
        StatusCode::FORBIDDEN if is_token_mismatch(body) => {
            Outcome::TokenRejected(error_message(status, body))
        }
        StatusCode::FORBIDDEN => Outcome::Forbidden(error_message(status, body)),
        _ => Outcome::Failed {
            status: status.as_u16(),
            message: error_message(status, body),
        },
    }
}

/// Server message from a `{ "message": ... }` body, else `HTTP <status>: <reason>`.
pub(crate) fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|json| json.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )
            .trim_end()
            .to_string()
        })
}

/// A 403 caused by a missing or stale anti-forgery token names CSRF in its body.
pub(crate) fn is_token_mismatch(body: &[u8]) -> bool {
    String::from_utf8_lossy(body)
        .to_ascii_lowercase()
        .contains("csrf")
}

/// Decodes a success body. 204 and empty bodies decode as JSON `null`.
pub(crate) fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ApiError> {
    if status == StatusCode::NO_CONTENT || body.is_empty() {
        return serde_json::from_value(Value::Null).map_err(|e| ApiError::Decode(e.to_string()));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}
