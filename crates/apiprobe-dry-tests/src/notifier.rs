// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Notifier fake that keeps every notification it receives.

use apiprobe_app_core::toast::{Notifier, ToastKind};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded `notify` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedToast {
    /// Severity.
    pub kind: ToastKind,
    /// Message text.
    pub message: String,
    /// Requested display duration.
    pub duration: Duration,
}

/// Records notifications in order, without TTL or dedupe.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    toasts: Arc<Mutex<Vec<RecordedToast>>>,
}

impl RecordingNotifier {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn toasts(&self) -> Vec<RecordedToast> {
        self.toasts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Messages recorded so far.
    pub fn messages(&self) -> Vec<String> {
        self.toasts().into_iter().map(|t| t.message).collect()
    }

    /// Number of notifications.
    pub fn count(&self) -> usize {
        self.toasts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: ToastKind, message: &str, duration: Duration) {
        self.toasts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedToast {
                kind,
                message: message.to_string(),
                duration,
            });
    }
}
