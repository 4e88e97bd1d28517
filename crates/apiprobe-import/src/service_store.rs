// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory holder of the currently imported service.

use crate::document::{Operation, ParsedSpec};
use crate::query_state::ImportMode;
use std::sync::{Arc, Mutex};

/// Everything known about one imported service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceImportInfo {
    /// Where the description was fetched from.
    pub service_url: String,
    /// How it was imported.
    pub import_mode: ImportMode,
    /// The parsed description.
    pub parsed_spec: ParsedSpec,
    /// Flattened operations in document order.
    pub operations: Vec<Operation>,
}

/// Single-slot store; readers get a shared snapshot, writers replace it whole.
#[derive(Debug, Default)]
pub struct ServiceStore {
    current: Mutex<Option<Arc<ServiceImportInfo>>>,
}

impl ServiceStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current service, if one was imported.
    pub fn get(&self) -> Option<Arc<ServiceImportInfo>> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the current service, returning the previous one.
    pub fn replace(&self, info: Arc<ServiceImportInfo>) -> Option<Arc<ServiceImportInfo>> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(info)
    }
}
