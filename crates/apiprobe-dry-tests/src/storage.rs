// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory session storage fake with call counters and failure injection.

use apiprobe_app_core::storage::{SessionStorage, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory implementation of [`SessionStorage`] for testing.
///
/// Clones share state, so a test can keep one handle while the code under
/// test owns another.
///
/// # Example
///
/// ```
/// use apiprobe_dry_tests::InMemorySessionStorage;
/// use apiprobe_app_core::{ConfigInfo, ConfigStore};
/// use std::sync::Arc;
///
/// let storage = InMemorySessionStorage::new();
/// let store = ConfigStore::new(Arc::new(storage.clone()));
///
/// store.update(ConfigInfo::new(5, None).unwrap());
/// assert_eq!(storage.set_count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemorySessionStorage {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    items: HashMap<String, String>,
    get_count: usize,
    set_count: usize,
    fail_on_get: bool,
    fail_on_set: bool,
}

impl InMemorySessionStorage {
    /// Create a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage holding `value` under `key`.
    pub fn with_item(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage.lock().items.insert(key.to_string(), value.to_string());
        storage
    }

    /// Make every `get_item` fail.
    pub fn set_fail_on_get(&self, fail: bool) {
        self.lock().fail_on_get = fail;
    }

    /// Make every `set_item` fail.
    pub fn set_fail_on_set(&self, fail: bool) {
        self.lock().fail_on_set = fail;
    }

    /// Number of `get_item` attempts, including failed ones.
    pub fn get_count(&self) -> usize {
        self.lock().get_count
    }

    /// Number of `set_item` attempts, including failed ones.
    pub fn set_count(&self) -> usize {
        self.lock().set_count
    }

    /// Raw value stored under `key`, bypassing counters.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock().items.get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStorage for InMemorySessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut inner = self.lock();
        inner.get_count += 1;
        if inner.fail_on_get {
            return Err(StorageError::Other("simulated get failure".into()));
        }
        Ok(inner.items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.lock();
        inner.set_count += 1;
        if inner.fail_on_set {
            return Err(StorageError::Other("simulated set failure".into()));
        }
        inner.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.lock().items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiprobe_app_core::{ConfigInfo, ConfigStore, CONFIG_INFO_STORAGE_KEY};

    #[test]
    fn failed_get_still_counts() {
        let storage = InMemorySessionStorage::new();
        storage.set_fail_on_get(true);
        assert!(storage.get_item("k").is_err());
        assert_eq!(storage.get_count(), 1);
    }

    #[test]
    fn failed_set_does_not_store() {
        let storage = InMemorySessionStorage::new();
        storage.set_fail_on_set(true);
        assert!(storage.set_item("k", "v").is_err());
        assert!(storage.peek("k").is_none());
        assert_eq!(storage.set_count(), 1);
    }

    #[test]
    fn config_store_reads_storage_once() {
        let storage = InMemorySessionStorage::with_item(
            CONFIG_INFO_STORAGE_KEY,
            r#"{"state":{"configInfo":{"timeout":7}}}"#,
        );
        let store = ConfigStore::new(Arc::new(storage.clone()));
        assert_eq!(store.read().unwrap().timeout_secs(), 7);
        assert_eq!(store.read().unwrap().timeout_secs(), 7);
        assert_eq!(storage.get_count(), 1);
    }

    #[test]
    fn unreadable_storage_degrades_to_no_config() {
        let storage = InMemorySessionStorage::new();
        storage.set_fail_on_get(true);
        let store = ConfigStore::new(Arc::new(storage));
        assert!(store.read().is_none());
    }

    #[test]
    fn failed_read_is_retried_on_next_read() {
        let storage = InMemorySessionStorage::with_item(
            CONFIG_INFO_STORAGE_KEY,
            r#"{"state":{"configInfo":{"timeout":42}},"version":0}"#,
        );
        storage.set_fail_on_get(true);
        let store = ConfigStore::new(Arc::new(storage.clone()));
        assert!(store.read().is_none());

        storage.set_fail_on_get(false);
        assert_eq!(store.read().unwrap().timeout_secs(), 42);
        assert_eq!(store.read().unwrap().timeout_secs(), 42);
        assert_eq!(storage.get_count(), 2);
    }

    #[test]
    fn failed_persist_keeps_session_value() {
        let storage = InMemorySessionStorage::new();
        storage.set_fail_on_set(true);
        let store = ConfigStore::new(Arc::new(storage.clone()));
        store.update(ConfigInfo::new(11, None).unwrap());
        assert_eq!(store.read().unwrap().timeout_secs(), 11);
        assert!(storage.peek(CONFIG_INFO_STORAGE_KEY).is_none());
    }
}
