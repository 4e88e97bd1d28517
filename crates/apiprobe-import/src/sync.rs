// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Startup reconciliation between the URL query and the service store.
//!
//! ```text
//! Idle -> Deciding -> Fetching -> Succeeded | Failed
//!                  \-> Skipped
//! ```
//!
//! [`ImportSync::initialize`] walks this machine once per instance and is the
//! only thing that moves [`ImportSync::phase`]. [`ImportSync::refetch`] may
//! run at any time, reporting through its [`FetchResult`] alone. Concurrent
//! fetches are not sequenced: whichever completes last owns the store.

use crate::document::{DocumentParser, OperationFlattener, ParseError, PathFlattener, SpecParser};
use crate::query_state::{ImportMode, QueryLocation};
use crate::service_store::{ServiceImportInfo, ServiceStore};
use apiprobe_app_core::{Notifier, ToastKind};
use apiprobe_http::{RequestDescriptor, RequestDispatcher, Transport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Warning shown when a search is submitted without a URL.
pub const BLANK_SEARCH_MESSAGE: &str = "please input the service url";

const BLANK_SEARCH_TOAST_DURATION: Duration = Duration::from_secs(3);

/// Where the reconciliation machine currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    /// `initialize` has not run.
    #[default]
    Idle,
    /// Reading the query state.
    Deciding,
    /// The startup fetch is in flight.
    Fetching,
    /// The startup fetch stored a service.
    Succeeded,
    /// The startup fetch returned a non-2xx outcome or an unparsable body.
    Failed,
    /// Startup took the non-fetch branch.
    Skipped,
}

/// Result of one fetch that did not raise.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// The service was parsed and stored.
    Succeeded(Arc<ServiceImportInfo>),
    /// The dispatcher returned a non-2xx outcome; it already notified.
    Failed {
        /// Status of the outcome, `None` when no response arrived.
        status: Option<u16>,
    },
}

/// Errors surfaced to callers of [`ImportSync`].
#[derive(Debug, Error)]
pub enum ImportError {
    /// The fetched body was not a usable service description.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Runs startup reconciliation and user-initiated imports.
pub struct ImportSync<T> {
    dispatcher: Arc<RequestDispatcher<T>>,
    location: Arc<dyn QueryLocation>,
    store: Arc<ServiceStore>,
    parser: Arc<dyn SpecParser>,
    flattener: Arc<dyn OperationFlattener>,
    notifier: Arc<dyn Notifier>,
    started: AtomicBool,
    phase: Mutex<SyncPhase>,
}

impl<T: Transport> ImportSync<T> {
    /// Reconciler using [`DocumentParser`] and [`PathFlattener`].
    pub fn new(
        dispatcher: Arc<RequestDispatcher<T>>,
        location: Arc<dyn QueryLocation>,
        store: Arc<ServiceStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_collaborators(
            dispatcher,
            location,
            store,
            Arc::new(DocumentParser),
            Arc::new(PathFlattener),
            notifier,
        )
    }

    /// Reconciler with explicit parse/flatten collaborators.
    pub fn with_collaborators(
        dispatcher: Arc<RequestDispatcher<T>>,
        location: Arc<dyn QueryLocation>,
        store: Arc<ServiceStore>,
        parser: Arc<dyn SpecParser>,
        flattener: Arc<dyn OperationFlattener>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            dispatcher,
            location,
            store,
            parser,
            flattener,
            notifier,
            started: AtomicBool::new(false),
            phase: Mutex::new(SyncPhase::Idle),
        }
    }

    /// Current phase of the startup reconciliation.
    pub fn phase(&self) -> SyncPhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The store this reconciler writes.
    pub fn store(&self) -> &ServiceStore {
        &self.store
    }

    /// One-shot startup reconciliation.
    ///
    /// Returns `Ok(None)` when startup skipped the fetch or when called again.
    pub async fn initialize(&self) -> Result<Option<FetchResult>, ImportError> {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("import reconciliation already ran; ignoring");
            return Ok(None);
        }
        self.set_phase(SyncPhase::Deciding);
        let mut state = self.location.import_query();

        if let Some(target) = state.fetch_target().map(str::to_string) {
            self.set_phase(SyncPhase::Fetching);
            let result = self.fetch(&target, false).await;
            self.set_phase(match result {
                Ok(FetchResult::Succeeded(_)) => SyncPhase::Succeeded,
                Ok(FetchResult::Failed { .. }) | Err(_) => SyncPhase::Failed,
            });
            return result.map(Some);
        }

        if state.logon.take().is_some() {
            self.location.set_import_query(&state);
        }
        self.set_phase(SyncPhase::Skipped);
        Ok(None)
    }

    /// Fetch `url` again. When `user_initiated`, a successful import also
    /// writes `serviceURL` into the query. Leaves [`Self::phase`] untouched.
    pub async fn refetch(&self, url: &str, user_initiated: bool) -> Result<FetchResult, ImportError> {
        self.fetch(url, user_initiated).await
    }

    /// Search box submit. Blank input only raises a warning.
    pub async fn search(&self, input: &str) -> Result<Option<FetchResult>, ImportError> {
        let url = input.trim();
        if url.is_empty() {
            self.notifier
                .notify(ToastKind::Warn, BLANK_SEARCH_MESSAGE, BLANK_SEARCH_TOAST_DURATION);
            return Ok(None);
        }
        self.refetch(url, true).await.map(Some)
    }

    async fn fetch(&self, url: &str, user_initiated: bool) -> Result<FetchResult, ImportError> {
        info!(%url, user_initiated, "fetching service description");
        let outcome = self.dispatcher.request(RequestDescriptor::get(url)).await;

        if !outcome.is_success() {
            return Ok(FetchResult::Failed {
                status: outcome.status,
            });
        }

        let parsed_spec = self.parser.parse(&outcome.data)?;
        let operations = self.flattener.flatten(parsed_spec.paths());
        let imported = Arc::new(ServiceImportInfo {
            service_url: url.to_string(),
            import_mode: ImportMode::Url,
            parsed_spec,
            operations,
        });
        self.store.replace(Arc::clone(&imported));

        if user_initiated {
            let mut state = self.location.import_query();
            state.service_url = Some(url.to_string());
            self.location.set_import_query(&state);
        }
        info!(
            %url,
            operations = imported.operations.len(),
            "service description imported"
        );
        Ok(FetchResult::Succeeded(imported))
    }

    fn set_phase(&self, next: SyncPhase) {
        let mut phase = self.phase.lock().unwrap_or_else(|e| e.into_inner());
        debug!(from = ?*phase, to = ?next, "import phase");
        *phase = next;
    }
}
