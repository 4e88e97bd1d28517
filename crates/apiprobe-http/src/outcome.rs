// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Uniform result shape for success and degraded failure.

use reqwest::header::HeaderMap;
use serde_json::Value;

/// What a request produced. Failures carry the same fields.
///
/// Non-JSON bodies are kept as a JSON string. A failure that never reached
/// the server has no status and null data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseOutcome {
    /// HTTP status, absent when no response was received.
    pub status: Option<u16>,
    /// Reason phrase for `status`.
    pub status_text: String,
    /// Response headers.
    pub headers: HeaderMap,
    /// Decoded body.
    pub data: Value,
}

impl ResponseOutcome {
    /// Outcome with `status` and `data`, no headers.
    pub fn new(status: u16, data: Value) -> Self {
        Self {
            status: Some(status),
            data,
            ..Self::default()
        }
    }

    /// Outcome for a request that produced no response at all.
    pub fn degraded() -> Self {
        Self::default()
    }

    /// Set the reason phrase.
    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    /// True for a status in `[200, 300)`.
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(s) if (200..300).contains(&s))
    }
}
