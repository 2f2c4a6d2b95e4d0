//! Handler responses.
//!
//! A handler either produces a [`Response`] or nothing; callers hold an
//! `Option<Response>` so "no response" cannot be confused with an empty one.

use serde_json::Value;

use crate::topic::ERROR_PATH;

/// Data a handler asks the runtime to publish under the adapter namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Relative path, e.g. `/powerState`.
    pub path: String,
    /// Value to publish, serialized with [`crate::payload::encode`].
    pub data: Value,
}

impl Response {
    /// Respond with `data` on `path`.
    #[must_use]
    pub fn new(path: impl Into<String>, data: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }

    /// Respond on the adapter's `/error` channel.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ERROR_PATH, Value::String(message.into()))
    }
}
