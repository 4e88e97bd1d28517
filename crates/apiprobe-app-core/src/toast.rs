// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transient notifications: the `Notifier` port plus a toast queue with TTL + dedupe.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Informational note.
    Info,
    /// Confirmation that a user action went through.
    Success,
    /// Warning that may need attention.
    Warn,
    /// Error requiring user awareness.
    Error,
}

/// Notification surface used by the request and import layers.
pub trait Notifier: Send + Sync {
    /// Show `message` for roughly `duration`.
    fn notify(&self, kind: ToastKind, message: &str, duration: Duration);
}

/// Identifier for a toast entry.
pub type ToastId = u64;

/// Toast data stored in the service.
#[derive(Debug, Clone)]
pub struct Toast {
    /// Stable identifier.
    pub id: ToastId,
    /// Severity.
    pub kind: ToastKind,
    /// Message text.
    pub message: String,
    /// Time-to-live duration.
    pub ttl: Duration,
    /// Creation time.
    pub created: Instant,
}

/// Rendering-friendly view of a toast.
#[derive(Debug, Clone)]
pub struct ToastRender {
    /// Stable identifier.
    pub id: ToastId,
    /// Severity.
    pub kind: ToastKind,
    /// Message text.
    pub message: String,
    /// 1.0 -> just created, 0.0 -> expired.
    pub progress: f32,
}

/// In-memory toast queue with TTL and dedupe window.
pub struct ToastService {
    queue: VecDeque<Toast>,
    max: usize,
    dedupe_window: Duration,
    next_id: ToastId,
}

impl ToastService {
    /// Create a new queue with a maximum length.
    pub fn new(max: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            max: max.max(1),
            dedupe_window: Duration::from_millis(500),
            next_id: 1,
        }
    }

    /// Push a toast, deduping identical recent entries (same kind/message within `dedupe_window`).
    pub fn push<S>(&mut self, kind: ToastKind, message: S, ttl: Duration, now: Instant) -> ToastId
    where
        S: Into<String>,
    {
        let message = message.into();

        if let Some(existing) = self.queue.iter_mut().find(|t| {
            t.kind == kind
                && t.message == message
                && now.duration_since(t.created) <= self.dedupe_window
        }) {
            existing.created = now;
            existing.ttl = ttl;
            return existing.id;
        }

        let id = self.next_id;
        self.next_id += 1;
        if self.queue.len() == self.max {
            self.queue.pop_front();
        }
        self.queue.push_back(Toast {
            id,
            kind,
            message,
            ttl,
            created: now,
        });
        id
    }

    /// Drop expired toasts (call once per tick).
    pub fn retain_visible(&mut self, now: Instant) {
        self.queue.retain(|t| now.duration_since(t.created) < t.ttl);
    }

    /// Return render-ready toasts with progress ratios.
    pub fn visible(&self, now: Instant) -> Vec<ToastRender> {
        self.queue
            .iter()
            .filter(|t| now.duration_since(t.created) < t.ttl)
            .map(|t| ToastRender {
                id: t.id,
                kind: t.kind,
                message: t.message.clone(),
                progress: 1.0
                    - (now.duration_since(t.created).as_secs_f32() / t.ttl.as_secs_f32()),
            })
            .collect()
    }

    /// Remove and return every queued toast, expired or not.
    pub fn drain(&mut self) -> Vec<Toast> {
        self.queue.drain(..).collect()
    }
}

/// Cloneable handle to a shared [`ToastService`] that implements [`Notifier`].
#[derive(Clone)]
pub struct SharedToasts {
    inner: Arc<Mutex<ToastService>>,
}

impl SharedToasts {
    /// Wrap a fresh queue holding at most `max` toasts.
    pub fn new(max: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ToastService::new(max))),
        }
    }

    /// Toasts still within their TTL right now.
    pub fn visible(&self) -> Vec<ToastRender> {
        let mut svc = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        svc.retain_visible(now);
        svc.visible(now)
    }

    /// Take everything raised so far.
    pub fn drain(&self) -> Vec<Toast> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain()
    }
}

impl Notifier for SharedToasts {
    fn notify(&self, kind: ToastKind, message: &str, duration: Duration) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(kind, message, duration, Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_toasts_within_window_are_deduped() {
        let mut svc = ToastService::new(8);
        let t0 = Instant::now();
        let a = svc.push(ToastKind::Error, "boom", Duration::from_secs(2), t0);
        let b = svc.push(
            ToastKind::Error,
            "boom",
            Duration::from_secs(2),
            t0 + Duration::from_millis(100),
        );
        assert_eq!(a, b);
        assert_eq!(svc.visible(t0 + Duration::from_millis(200)).len(), 1);
    }

    #[test]
    fn different_kind_is_not_deduped() {
        let mut svc = ToastService::new(8);
        let t0 = Instant::now();
        svc.push(ToastKind::Error, "same", Duration::from_secs(2), t0);
        svc.push(ToastKind::Warn, "same", Duration::from_secs(2), t0);
        assert_eq!(svc.visible(t0).len(), 2);
    }

    #[test]
    fn expired_toasts_drop_out() {
        let mut svc = ToastService::new(8);
        let t0 = Instant::now();
        svc.push(ToastKind::Error, "short", Duration::from_secs(2), t0);
        let later = t0 + Duration::from_secs(3);
        assert!(svc.visible(later).is_empty());
        svc.retain_visible(later);
        assert!(svc.drain().is_empty());
    }

    #[test]
    fn queue_is_bounded() {
        let mut svc = ToastService::new(2);
        let t0 = Instant::now();
        svc.push(ToastKind::Info, "a", Duration::from_secs(5), t0);
        svc.push(ToastKind::Info, "b", Duration::from_secs(5), t0);
        svc.push(ToastKind::Info, "c", Duration::from_secs(5), t0);
        let messages: Vec<_> = svc.drain().into_iter().map(|t| t.message).collect();
        assert_eq!(messages, vec!["b", "c"]);
    }

    #[test]
    fn shared_toasts_record_notifications() {
        let toasts = SharedToasts::new(4);
        toasts.notify(ToastKind::Error, "bad request", Duration::from_secs(2));
        let visible = toasts.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, "bad request");
        assert_eq!(visible[0].kind, ToastKind::Error);
    }
}
