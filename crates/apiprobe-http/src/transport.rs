// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transport port: the one place a request can fail.

use crate::outcome::ResponseOutcome;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Fully resolved request handed to a [`Transport`].
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// HTTP method.
    pub method: Method,
    /// Final URL including the encoded query.
    pub url: Url,
    /// Merged headers.
    pub headers: HeaderMap,
    /// JSON body.
    pub body: Option<Value>,
    /// Timeout the transport must enforce.
    pub timeout: Duration,
}

/// Broad category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Could not connect (DNS, refused, TLS).
    Connect,
    /// Timed out.
    Timeout,
    /// The server answered with a non-success status.
    Status,
    /// The request could not be built (bad URL, unencodable body).
    InvalidRequest,
    /// Anything else.
    Other,
}

/// A failed send. `response` is set when the server did answer.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    /// Failure category.
    pub kind: TransportErrorKind,
    /// Transport's own description.
    pub message: String,
    /// Response received before failing, if any.
    pub response: Option<ResponseOutcome>,
}

impl TransportError {
    /// Failure without a response.
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            response: None,
        }
    }

    /// Attach the response the server sent.
    pub fn with_response(mut self, response: ResponseOutcome) -> Self {
        self.response = Some(response);
        self
    }
}

/// Executes prepared requests. Resolving `Ok` means the server answered in a
/// way the transport accepts; anything else is an `Err`.
pub trait Transport: Send + Sync {
    /// Send `request` and wait for it to settle.
    fn send(
        &self,
        request: PreparedRequest,
    ) -> impl Future<Output = Result<ResponseOutcome, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: PreparedRequest,
    ) -> impl Future<Output = Result<ResponseOutcome, TransportError>> + Send {
        (**self).send(request)
    }
}
