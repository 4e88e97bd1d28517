// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scripted transport: replies come from a FIFO queue, requests are recorded.

use apiprobe_http::{
    PreparedRequest, ResponseOutcome, Transport, TransportError, TransportErrorKind,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

type Reply = Result<ResponseOutcome, TransportError>;

struct Scripted {
    reply: Reply,
    release: Option<oneshot::Receiver<()>>,
}

#[derive(Default)]
struct Inner {
    replies: VecDeque<Scripted>,
    requests: Vec<PreparedRequest>,
}

/// Transport fake for dispatcher and import tests.
///
/// Each `send` records the request and pops the next scripted reply. With an
/// empty queue it fails like a refused connection. Held replies settle only
/// once their release sender fires (or is dropped), which lets a test choose
/// the order in which concurrent requests resolve.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedTransport {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn push_ok(&self, outcome: ResponseOutcome) {
        self.push(Ok(outcome), None);
    }

    /// Queue a failure.
    pub fn push_err(&self, err: TransportError) {
        self.push(Err(err), None);
    }

    /// Queue a reply that waits for the returned sender.
    pub fn push_held(&self, reply: Reply) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(reply, Some(rx));
        tx
    }

    /// Requests seen so far, in send order.
    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests seen so far.
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn push(&self, reply: Reply, release: Option<oneshot::Receiver<()>>) {
        self.lock().replies.push_back(Scripted { reply, release });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: PreparedRequest) -> impl Future<Output = Reply> + Send {
        let next = {
            let mut inner = self.lock();
            inner.requests.push(request);
            inner.replies.pop_front()
        };
        async move {
            let Some(Scripted { reply, release }) = next else {
                return Err(TransportError::new(
                    TransportErrorKind::Connect,
                    "connect ECONNREFUSED (no scripted reply)",
                ));
            };
            if let Some(release) = release {
                // A dropped sender releases too.
                let _ = release.await;
            }
            reply
        }
    }
}

/// Outcome with `status`, a JSON body and the matching reason phrase.
pub fn json_outcome(status: u16, data: Value) -> ResponseOutcome {
    let reason = match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    };
    ResponseOutcome::new(status, data).with_status_text(reason)
}

/// Failure the way an HTTP transport reports a non-2xx answer.
pub fn status_error(status: u16, data: Value) -> TransportError {
    TransportError::new(
        TransportErrorKind::Status,
        format!("Request failed with status code {status}"),
    )
    .with_response(json_outcome(status, data))
}
