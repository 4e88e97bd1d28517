// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Human-readable message for a failed request.
//!
//! Extractors run in a fixed order and the first non-empty text wins:
//! body `message`, body `msg`, primitive body, status text, the failure's
//! own message, then [`FALLBACK_MESSAGE`].

use crate::transport::TransportError;
use serde_json::Value;

/// Used when nothing better can be derived.
pub const FALLBACK_MESSAGE: &str = "api request is error, please check";

type Extractor = fn(&TransportError) -> Option<String>;

const EXTRACTORS: [Extractor; 5] = [
    body_message,
    body_msg,
    primitive_body,
    status_text,
    own_message,
];

/// Derive the message shown to the user for `err`.
pub fn failure_message(err: &TransportError) -> String {
    EXTRACTORS
        .iter()
        .find_map(|extract| extract(err))
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
}

fn body(err: &TransportError) -> Option<&Value> {
    err.response.as_ref().map(|r| &r.data)
}

fn body_message(err: &TransportError) -> Option<String> {
    body(err)?.get("message").and_then(truthy_text)
}

fn body_msg(err: &TransportError) -> Option<String> {
    body(err)?.get("msg").and_then(truthy_text)
}

fn primitive_body(err: &TransportError) -> Option<String> {
    match body(err)? {
        v @ (Value::String(_) | Value::Number(_) | Value::Bool(_)) => truthy_text(v),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn status_text(err: &TransportError) -> Option<String> {
    err.response
        .as_ref()
        .map(|r| r.status_text.clone())
        .filter(|s| !s.is_empty())
}

fn own_message(err: &TransportError) -> Option<String> {
    Some(err.message.clone()).filter(|s| !s.is_empty())
}

/// Text for a loosely-truthy JSON value; `None` for null, false, 0 and "".
fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) => (n.as_f64() != Some(0.0)).then(|| n.to_string()),
        Value::String(s) => (!s.is_empty()).then(|| s.clone()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
