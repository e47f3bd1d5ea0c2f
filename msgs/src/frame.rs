//! Text frames exchanged over the push channel.
//!
//! Every frame is a JSON object `{"event": "<name>", "data": {...}}`. The
//! envelope is split first so an unknown event name can be skipped without
//! treating it as a malformed payload.

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{Number, Value};

use crate::decode_error::DecodeError;

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

pub fn split(frame: &str) -> Result<(String, Value), DecodeError> {
    let envelope = serde_json::from_str::<Envelope>(frame).map_err(DecodeError::InvalidFrame)?;
    Ok((envelope.event, envelope.data))
}

pub fn payload<T: DeserializeOwned>(event: &'static str, data: Value) -> Result<T, DecodeError> {
    serde_json::from_value(data).map_err(|source| DecodeError::MalformedPayload { event, source })
}

/// Reads an optional label field leniently: blank strings, zero, `false`,
/// null and structured values all count as absent.
pub fn label_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(number_text(&n)),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Reads a required label field that may be sent as a string or a number.
/// Nothing is defaulted here, an empty string stays empty.
pub fn required_label_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(n) => Some(number_text(&n)),
        _ => None,
    }
}

/// Whole floats render without a fraction, `7.0` reads as `7`.
pub fn number_text(n: &Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            return f.to_string();
        }
    }
    n.to_string()
}
