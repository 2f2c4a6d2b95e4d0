//! Message payloads — inbound decoding and the outbound serialization rule.
//!
//! Inbound payloads are decoded as JSON when possible and otherwise kept as
//! text. Outbound values are published as JSON when structured and as their
//! plain textual form when primitive (a string is published without quotes).

use serde_json::Value;

/// A message as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Full topic the message arrived on.
    pub topic: String,
    /// Undecoded payload bytes.
    pub raw_payload: Vec<u8>,
}

impl InboundMessage {
    /// Create a message from a topic and raw bytes.
    #[must_use]
    pub fn new(topic: impl Into<String>, raw_payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            raw_payload: raw_payload.into(),
        }
    }
}

/// A decoded inbound payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The payload was valid JSON.
    Json(Value),
    /// The payload was not JSON and is passed through as text.
    Text(String),
}

impl Payload {
    /// Decode raw bytes opportunistically as JSON.
    ///
    /// Invalid UTF-8 sequences are replaced before decoding.
    ///
    /// # Errors
    ///
    /// Returns a [`PayloadDecodeError`] carrying the text fallback when the
    /// bytes are not JSON. The failure is informational; callers continue
    /// with [`PayloadDecodeError::into_payload`].
    pub fn decode(raw: &[u8]) -> Result<Self, PayloadDecodeError> {
        let text = String::from_utf8_lossy(raw).into_owned();
        match serde_json::from_str(&text) {
            Ok(value) => Ok(Self::Json(value)),
            Err(source) => Err(PayloadDecodeError { text, source }),
        }
    }

    /// Borrow the payload as a string, if it is text or a JSON string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Json(Value::String(s)) | Self::Text(s) => Some(s),
            Self::Json(_) => None,
        }
    }

    /// Borrow the decoded JSON value, if any.
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Convert into a JSON value; text becomes a JSON string.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }
}

/// The payload was not valid JSON.
#[derive(Debug, thiserror::Error)]
#[error("payload is not valid JSON")]
pub struct PayloadDecodeError {
    text: String,
    #[source]
    source: serde_json::Error,
}

impl PayloadDecodeError {
    /// The original text, as it will be passed on.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Fall back to the unparsed text.
    #[must_use]
    pub fn into_payload(self) -> Payload {
        Payload::Text(self.text)
    }
}

/// Serialize a value for publication.
///
/// Strings are published verbatim, every other value (numbers, booleans,
/// null, objects, arrays) as its JSON text.
#[must_use]
pub fn encode(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
