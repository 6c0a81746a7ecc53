use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::printf::Arg;

/// Tag identifying which integration produced a line.
pub const HANDLER_ATTR: &str = "handler";
/// Connection the line relates to.
pub const CONNECTION_ATTR: &str = "connection";
/// Account the line relates to.
pub const ACCOUNT_ATTR: &str = "account";
/// Per-request correlation id.
pub const STREAM_ID_ATTR: &str = "streamId";
pub const HTTP_METHOD_ATTR: &str = "method";
pub const BODY_ATTR: &str = "body";

/// Longest body text kept in a `body` field, in bytes.
pub const MAX_BODY_LEN: usize = 2048;

/// A named value attached to a log line beyond its message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub key: String,
    pub value: Value,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    pub fn string(key: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::new(key, value.to_string())
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, value)
    }

    pub fn stream_id(id: impl fmt::Display) -> Self {
        Self::string(STREAM_ID_ATTR, id)
    }

    /// Size-safe `body` field.
    ///
    /// Text or bytes that parse as JSON are embedded as JSON when the encoded
    /// form fits in [`MAX_BODY_LEN`] bytes; anything else, oversized JSON
    /// included, becomes a string cut at that length. Bytes are decoded as
    /// UTF-8, lossily. A missing body is `null`.
    pub fn body(body: Option<&Arg>) -> Self {
        let value = match body {
            None | Some(Arg::Nil) => Value::Null,
            Some(Arg::Bytes(bytes)) => body_text(&String::from_utf8_lossy(bytes)),
            Some(Arg::Str(text)) => body_text(text),
            Some(Arg::Json(Value::String(text))) => body_text(text),
            Some(Arg::Json(value)) => bounded_json(value.clone(), value.to_string()),
            Some(other) => other.to_json(),
        };
        Self::new(BODY_ATTR, value)
    }
}

fn body_text(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            let encoded = value.to_string();
            return bounded_json(value, encoded);
        }
    }
    Value::String(truncate_utf8(text, MAX_BODY_LEN))
}

fn bounded_json(value: Value, encoded: String) -> Value {
    if encoded.len() <= MAX_BODY_LEN {
        value
    } else {
        Value::String(truncate_utf8(&encoded, MAX_BODY_LEN))
    }
}

fn truncate_utf8(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Renders as `key=value`, strings unquoted when they have no whitespace.
impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::String(s) if !s.is_empty() && !s.contains(char::is_whitespace) => {
                write!(f, "{}={}", self.key, s)
            }
            Value::String(s) => write!(f, "{}={:?}", self.key, s),
            other => write!(f, "{}={}", self.key, other),
        }
    }
}
