// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `reqwest`-backed [`Transport`]. Non-2xx answers are failures carrying the response.

use crate::outcome::ResponseOutcome;
use crate::transport::{PreparedRequest, Transport, TransportError, TransportErrorKind};
use serde_json::Value;

/// HTTP transport over a shared `reqwest::Client`.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Transport with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport over an existing client (proxies, TLS roots, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> Result<ResponseOutcome, TransportError> {
        let PreparedRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;
        let mut builder = self
            .client
            .request(method, url)
            .headers(headers)
            .timeout(timeout);
        if let Some(body) = body {
            let bytes = serde_json::to_vec(&body).map_err(|err| {
                TransportError::new(TransportErrorKind::InvalidRequest, err.to_string())
            })?;
            builder = builder.body(bytes);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let response_headers = response.headers().clone();
        let bytes = response.bytes().await.map_err(classify)?;

        let outcome = ResponseOutcome {
            status: Some(status.as_u16()),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers: response_headers,
            data: decode_body(&bytes),
        };
        if status.is_success() {
            Ok(outcome)
        } else {
            Err(TransportError::new(
                TransportErrorKind::Status,
                format!("Request failed with status code {}", status.as_u16()),
            )
            .with_response(outcome))
        }
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else if err.is_builder() {
        TransportErrorKind::InvalidRequest
    } else {
        TransportErrorKind::Other
    };
    TransportError::new(kind, err.to_string())
}

/// JSON when the body parses as JSON, otherwise the raw text as a JSON string.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::String(String::new());
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
