use serde_json::{Value, json};

use crate::error::{ApiError, Operation};

/// What a success body turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Empty,
    Malformed,
    Json(Value),
}

impl Decoded {
    pub fn into_json(self) -> Option<Value> {
        match self {
            Decoded::Json(v) => Some(v),
            Decoded::Empty | Decoded::Malformed => None,
        }
    }
}

pub fn decode(operation: Operation, body: &[u8]) -> Decoded {
    let text = match std::str::from_utf8(body) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(%operation, error = %e, "response body is not valid utf-8");
            return Decoded::Malformed;
        }
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Decoded::Empty;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(v) => Decoded::Json(v),
        Err(e) => {
            tracing::warn!(
                %operation,
                error = %e,
                body = %preview(trimmed),
                "response body is not valid json"
            );
            Decoded::Malformed
        }
    }
}

/// Empty or unparseable bodies become `default`.
pub fn decode_or(operation: Operation, body: &[u8], default: Value) -> Value {
    decode(operation, body).into_json().unwrap_or(default)
}

pub fn decode_strict(operation: Operation, body: &[u8]) -> Result<Value, ApiError> {
    decode(operation, body)
        .into_json()
        .ok_or(ApiError::MalformedBody { operation })
}

pub fn success_default() -> Value {
    json!({ "success": true })
}

pub fn vote_default() -> Value {
    json!({ "agree_count": 0, "disagree_count": 0, "success": true })
}

fn preview(text: &str) -> String {
    const MAX: usize = 200;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
