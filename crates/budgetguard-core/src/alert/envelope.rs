//! Delivery envelope (Pub/Sub push shape).
//!
//! Unknown fields are tolerated here: the transport adds metadata
//! (`publishTime`, `deliveryAttempt`, ...) that this crate does not care about.

use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{GuardError, Result};

/// Event envelope as delivered by the transport.
#[derive(Debug, Default, Deserialize)]
pub struct EventEnvelope {
    /// Wrapped message; absent means nothing was published.
    #[serde(default)]
    pub message: Option<PubsubMessage>,
    /// Subscription the event was delivered through.
    #[serde(default)]
    pub subscription: Option<String>,
}

/// Message body inside the envelope.
#[derive(Debug, Default, Deserialize)]
pub struct PubsubMessage {
    /// Base64-encoded UTF-8 JSON alert payload.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default, rename = "messageId")]
    pub message_id: Option<String>,
}

impl EventEnvelope {
    /// Parse an envelope from a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| GuardError::MalformedPayload(format!("invalid envelope: {e}")))
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message.as_ref().and_then(|m| m.message_id.as_deref())
    }

    fn encoded_data(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|m| m.data.as_deref())
            .filter(|d| !d.is_empty())
    }
}

/// Decode `message.data` (base64 -> UTF-8 -> JSON object).
///
/// Missing or empty data yields an empty map, and so does any decoded value
/// that is blank (`null`, `false`, `0`, `""`, `[]`). Other non-object values
/// are malformed.
pub fn decode_payload(env: &EventEnvelope) -> Result<Map<String, Value>> {
    let Some(encoded) = env.encoded_data() else {
        return Ok(Map::new());
    };

    let raw = Base64
        .decode(encoded.trim())
        .map_err(|e| GuardError::MalformedPayload(format!("invalid base64: {e}")))?;
    let text = String::from_utf8(raw)
        .map_err(|e| GuardError::MalformedPayload(format!("invalid utf-8: {e}")))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| GuardError::MalformedPayload(format!("invalid json: {e}")))?;

    match value {
        Value::Object(map) => Ok(map),
        other if is_blank(&other) => Ok(Map::new()),
        other => Err(GuardError::MalformedPayload(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(m) => m.is_empty(),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
