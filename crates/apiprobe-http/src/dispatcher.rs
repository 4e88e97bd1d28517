// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The request dispatcher: session defaults in, uniform outcome out.

use crate::descriptor::RequestDescriptor;
use crate::failure::failure_message;
use crate::outcome::ResponseOutcome;
use crate::query::QueryEncoding;
use crate::transport::{PreparedRequest, Transport, TransportError, TransportErrorKind};
use apiprobe_app_core::{ConfigStore, Notifier, ToastKind};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// How long a failure toast stays up.
pub const FAILURE_TOAST_DURATION: Duration = Duration::from_secs(2);

/// Wraps a [`Transport`] with session config and failure normalization.
pub struct RequestDispatcher<T> {
    transport: T,
    config: Arc<ConfigStore>,
    notifier: Arc<dyn Notifier>,
}

impl<T: Transport> RequestDispatcher<T> {
    /// Build a dispatcher reading defaults from `config` and reporting failures to `notifier`.
    pub fn new(transport: T, config: Arc<ConfigStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            transport,
            config,
            notifier,
        }
    }

    /// The session config this dispatcher reads.
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// The wrapped transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `descriptor`. Never fails: transport errors are turned into one
    /// error toast and a degraded outcome.
    pub async fn request(&self, descriptor: RequestDescriptor) -> ResponseOutcome {
        let prepared = match self.prepare(descriptor) {
            Ok(prepared) => prepared,
            Err(err) => return self.absorb(err),
        };
        debug!(
            method = %prepared.method,
            url = %prepared.url,
            timeout_ms = u64::try_from(prepared.timeout.as_millis()).unwrap_or(u64::MAX),
            "dispatching request"
        );
        match self.transport.send(prepared).await {
            Ok(outcome) => outcome,
            Err(err) => self.absorb(err),
        }
    }

    /// Apply the default method, timeout and `Content-Type` to `descriptor`
    /// and encode its query. The configured authorization is not sent;
    /// callers that need it put it on the descriptor.
    pub fn prepare(&self, descriptor: RequestDescriptor) -> Result<PreparedRequest, TransportError> {
        let RequestDescriptor {
            method,
            url,
            params,
            body,
            headers,
            timeout,
        } = descriptor;
        let method = method.unwrap_or(Method::GET);
        let timeout = timeout.unwrap_or_else(|| self.config.effective_timeout());

        // Descriptor headers replace defaults of the same name.
        let mut merged = HeaderMap::new();
        merged.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        merged.extend(headers);

        let mut url = Url::parse(&url).map_err(|err| {
            TransportError::new(
                TransportErrorKind::InvalidRequest,
                format!("invalid url {url:?}: {err}"),
            )
        })?;
        QueryEncoding::for_request(&method, &params).apply_to(&mut url);

        Ok(PreparedRequest {
            method,
            url,
            headers: merged,
            body,
            timeout,
        })
    }

    fn absorb(&self, err: TransportError) -> ResponseOutcome {
        let message = failure_message(&err);
        warn!(
            kind = ?err.kind,
            status = ?err.response.as_ref().and_then(|r| r.status),
            %message,
            "request failed"
        );
        self.notifier
            .notify(ToastKind::Error, &message, FAILURE_TOAST_DURATION);
        err.response.unwrap_or_else(ResponseOutcome::degraded)
    }
}
