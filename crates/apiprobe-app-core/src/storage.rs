// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Session storage port (web-storage shaped key/value strings) and the
//! in-memory adapter that lives exactly as long as the session does.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Storage port for session-scoped string values keyed by logical name.
pub trait SessionStorage: Send + Sync {
    /// Read the value stored under `key`. Returns `Ok(None)` when missing.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Remove `key` if present.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Error type for storage adapters.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// Process-local session storage; dropped together with the session.
///
/// Clones share the same backing map.
#[derive(Clone, Default)]
pub struct MemorySessionStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_none() {
        let storage = MemorySessionStorage::new();
        assert!(storage.get_item("nope").unwrap().is_none());
    }

    #[test]
    fn set_replaces_and_remove_clears() {
        let storage = MemorySessionStorage::new();
        storage.set_item("k", "one").unwrap();
        storage.set_item("k", "two").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("two"));
        assert_eq!(storage.len(), 1);

        storage.remove_item("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn clones_share_items() {
        let a = MemorySessionStorage::new();
        let b = a.clone();
        a.set_item("shared", "yes").unwrap();
        assert_eq!(b.get_item("shared").unwrap().as_deref(), Some("yes"));
    }

    #[test]
    fn io_failures_convert_and_describe_themselves() {
        fn failing() -> Result<(), StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"))?;
            Ok(())
        }
        let err = failing().unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert_eq!(err.to_string(), "io error: denied");
        assert_eq!(StorageError::Other("x".into()).to_string(), "other: x");
    }
}
