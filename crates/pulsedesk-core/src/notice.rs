//! Decoding of raw push-channel payloads
//!
//! The server gives no schema guarantee for a pushed payload: it may be a
//! bare JSON string (a legacy toast line), a structured object carrying an
//! `event` discriminator, or arbitrary junk. [`Notice::parse`] is the single
//! entry point that turns whatever arrived into a typed value, and it is
//! total: a malformed payload degrades to plain text instead of erroring,
//! so one bad message can never break the channel's dispatch loop.

use serde_json::Value;
use tracing::{debug, warn};

/// A decoded push-channel message
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Payload was not structured data, or was a bare string
    PlainText {
        /// The text to hand to the toast policy
        text: String,
    },
    /// Payload decoded to an object with an `event` discriminator
    Structured {
        /// The `event` field value, e.g. `connection-status`
        kind: String,
        /// Kind-specific payload fields
        data: Value,
    },
}

impl Notice {
    /// Decode one raw payload into a `Notice`
    ///
    /// Decoding rules, in order:
    /// - a JSON string scalar becomes [`Notice::PlainText`] with that string
    /// - a JSON object with a string `event` field becomes
    ///   [`Notice::Structured`]; its `data` member is used when it is an
    ///   object, otherwise the remaining fields are kept as-is
    /// - any other JSON shape is re-serialized into plain text (the message
    ///   is never dropped)
    /// - anything that is not JSON at all is passed through verbatim
    pub fn parse(raw: &str) -> Notice {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::String(text)) => Notice::PlainText { text },
            Ok(Value::Object(mut fields)) => {
                let kind = fields
                    .get("event")
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                match kind {
                    Some(kind) => {
                        fields.remove("event");
                        let data = match fields.remove("data") {
                            Some(data @ Value::Object(_)) => data,
                            Some(other) => {
                                // Non-object `data` stays alongside its siblings.
                                fields.insert("data".to_string(), other);
                                Value::Object(fields)
                            }
                            None => Value::Object(fields),
                        };
                        Notice::Structured { kind, data }
                    }
                    None => Notice::PlainText {
                        text: Value::Object(fields).to_string(),
                    },
                }
            }
            Ok(other) => {
                debug!("payload decoded to a non-object shape, showing it stringified");
                Notice::PlainText {
                    text: other.to_string(),
                }
            }
            Err(e) => {
                warn!(error = %e, "payload is not JSON, treating as plain text");
                Notice::PlainText {
                    text: raw.to_owned(),
                }
            }
        }
    }
}
