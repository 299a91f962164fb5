//! Response classification.
//!
//! Turns a completed HTTP exchange into the unwrapped `data` payload or one
//! typed [`KuberaError`]. Both the async and blocking clients route every
//! response through [`handle_response`].

use crate::error::{KuberaError, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

const AUTH_HINT: &str = "Check: 1) Credentials are correct, \
    2) IP address is allowed (some API keys have IP restrictions)";

const PERMISSION_HINT: &str = "Note: Update operations require an API key with update \
    permissions enabled. Read-only API keys cannot modify data.";

const RATE_LIMIT_HINT: &str = "Limits: 30 req/min, 100/day (Essential) or 1000/day (Black)";

/// Classify a response by status code and raw body text.
///
/// 2xx bodies are parsed and unwrapped from the `{"data": ...}` envelope.
/// Anything else becomes exactly one error variant.
pub fn handle_response(status: u16, body: &str) -> Result<Value> {
    if (200..300).contains(&status) {
        let value = parse_success_body(body)?;
        Ok(unwrap_envelope(value))
    } else {
        Err(classify_error(status, body))
    }
}

/// Return the inner `data` field of an envelope, or the value itself when it
/// is not wrapped.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Map a non-success response to its error variant.
///
/// Never fails: bodies that are not JSON fall back to their raw text.
pub fn classify_error(status: u16, body: &str) -> KuberaError {
    let raw_body: Option<Value> = serde_json::from_str(body).ok();
    let server_message = server_message(status, raw_body.as_ref(), body);

    match status {
        401 => KuberaError::Authentication {
            message: format!("Authentication failed: {server_message}. {AUTH_HINT}"),
            status_code: status,
            raw_body,
        },
        403 => KuberaError::Permission {
            message: format!("Permission denied: {server_message}. {PERMISSION_HINT}"),
            status_code: status,
            raw_body,
        },
        429 => KuberaError::RateLimit {
            message: format!("Rate limit exceeded: {server_message}. {RATE_LIMIT_HINT}"),
            status_code: status,
            raw_body,
        },
        400 => KuberaError::Validation {
            message: format!("Validation error: {server_message}"),
            status_code: status,
            raw_body,
        },
        _ => KuberaError::Api {
            message: format!("API error ({status}): {server_message}"),
            status_code: status,
            raw_body,
        },
    }
}

/// Deserialize an unwrapped payload into a typed record.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| KuberaError::Decode(e.to_string()))
}

fn parse_success_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| KuberaError::Decode(format!("invalid JSON body: {e}")))
}

fn server_message(status: u16, parsed: Option<&Value>, body: &str) -> String {
    let from_json = match parsed {
        Some(Value::Object(map)) => map.get("message").and_then(Value::as_str),
        Some(Value::String(text)) => Some(text.as_str()),
        _ => None,
    };
    if let Some(message) = from_json.filter(|m| !m.is_empty()) {
        return message.to_string();
    }

    let text = body.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string()
}
