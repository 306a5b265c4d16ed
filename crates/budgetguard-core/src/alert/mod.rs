//! Inbound budget alert handling.
//!
//! Two layers:
//! - `envelope`: the delivery envelope (`message.data` as base64 JSON).
//! - `record`: the typed alert record extracted from the decoded JSON.
//!
//! Decoding is panic-free: anything that cannot be interpreted becomes
//! `GuardError::MalformedPayload`. Absent data is not an error; it decodes to
//! `None` so the caller can treat it as "nothing to do".

pub mod envelope;
pub mod record;

pub use envelope::{decode_payload, EventEnvelope, PubsubMessage};
pub use record::AlertRecord;

use crate::error::Result;

/// Decode an envelope all the way to an alert record.
///
/// Returns `Ok(None)` when the envelope carries no data or the data decodes to
/// a blank value (`null`, `{}`, `[]`, `""`, `false`, `0`).
pub fn decode_alert(env: &EventEnvelope) -> Result<Option<AlertRecord>> {
    let payload = decode_payload(env)?;
    if payload.is_empty() {
        return Ok(None);
    }
    AlertRecord::from_payload(payload).map(Some)
}
