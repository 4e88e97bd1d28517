// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Import reconciliation for apiprobe.
//!
//! The navigable URL carries the import state (`serviceURL`,
//! `importModeType`, `logon`). [`ImportSync`] aligns it with the in-memory
//! [`ServiceStore`] once per mount and serves later user-initiated imports.

pub mod document;
pub mod query_state;
pub mod service_store;
pub mod sync;

pub use document::{
    DocumentParser, Operation, OperationFlattener, ParseError, ParsedSpec, PathFlattener,
    SpecParser,
};
pub use query_state::{
    ImportMode, ImportQueryState, MemoryLocation, QueryLocation, IMPORT_MODE_KEY, LOGON_KEY,
    SERVICE_URL_KEY,
};
pub use service_store::{ServiceImportInfo, ServiceStore};
pub use sync::{FetchResult, ImportError, ImportSync, SyncPhase, BLANK_SEARCH_MESSAGE};
