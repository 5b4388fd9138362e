//! Server-Sent Events framing for the pseudo-stream.
//!
//! Every event the relay sends is a single `data: <payload>` line followed by
//! a blank line. Payloads are compact JSON or the `[DONE]` marker, neither of
//! which contains a raw newline.

use std::fmt;

/// One `data:` event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    data: String,
}

impl Event {
    pub fn data(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    /// Serializes `payload` as compact JSON into a data event.
    pub fn json<T: serde::Serialize>(payload: &T) -> serde_json::Result<Self> {
        serde_json::to_string(payload).map(Self::data)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data: {}\n\n", self.data)
    }
}
