// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles for apiprobe crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`storage`] - In-memory session storage with call counters and failure injection
//! - [`notifier`] - Notifier that records every toast
//! - [`transport`] - Scripted transport that records requests and can hold replies

pub mod notifier;
pub mod storage;
pub mod transport;

pub use notifier::{RecordedToast, RecordingNotifier};
pub use storage::InMemorySessionStorage;
pub use transport::{json_outcome, status_error, ScriptedTransport};
