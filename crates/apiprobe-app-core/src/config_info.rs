// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Session-scoped request configuration (timeout, authorization).
//!
//! [`ConfigStore`] is the single source of truth for request-affecting
//! settings. It is constructed explicitly over a [`SessionStorage`] and is
//! dropped with the session. The persisted value is read lazily on first use
//! and any storage or decoding problem degrades to "no configuration".

use crate::storage::{SessionStorage, StorageError};
use crate::toast::{Notifier, ToastKind};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Fixed storage key for the persisted configuration envelope.
pub const CONFIG_INFO_STORAGE_KEY: &str = "config-info-storage";
/// Timeout applied when no configuration has been saved.
pub const DEFAULT_TIMEOUT_SECS: u32 = 120;
/// Smallest accepted timeout.
pub const MIN_TIMEOUT_SECS: u32 = 1;
/// Largest accepted timeout.
pub const MAX_TIMEOUT_SECS: u32 = 3600;

const UPDATE_SUCCESS_MESSAGE: &str = "update config success";

/// Error type for configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Timeout outside `[MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS]`.
    #[error("timeout must be between 1 and 3600 seconds, got {0}")]
    TimeoutOutOfRange(i64),
}

/// Session-level request policy applied to every outbound call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConfigInfoRepr", into = "ConfigInfoRepr")]
pub struct ConfigInfo {
    timeout_secs: u32,
    authorization: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct ConfigInfoRepr {
    timeout: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    authorization: Option<String>,
}

impl ConfigInfo {
    /// Build a validated config. Empty authorization is treated as absent.
    pub fn new(timeout_secs: i64, authorization: Option<String>) -> Result<Self, ConfigError> {
        let timeout_secs = u32::try_from(timeout_secs)
            .ok()
            .filter(|t| (MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(t))
            .ok_or(ConfigError::TimeoutOutOfRange(timeout_secs))?;
        Ok(Self {
            timeout_secs,
            authorization: authorization.filter(|a| !a.is_empty()),
        })
    }

    /// Request timeout in seconds.
    pub fn timeout_secs(&self) -> u32 {
        self.timeout_secs
    }

    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.timeout_secs) * 1000)
    }

    /// Value for the `Authorization` header, if any.
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }
}

impl TryFrom<ConfigInfoRepr> for ConfigInfo {
    type Error = ConfigError;

    fn try_from(repr: ConfigInfoRepr) -> Result<Self, Self::Error> {
        Self::new(repr.timeout, repr.authorization)
    }
}

impl From<ConfigInfo> for ConfigInfoRepr {
    fn from(info: ConfigInfo) -> Self {
        Self {
            timeout: i64::from(info.timeout_secs),
            authorization: info.authorization,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ConfigEnvelope {
    state: ConfigEnvelopeState,
    #[serde(default)]
    version: u32,
}

#[derive(Serialize, Deserialize)]
struct ConfigEnvelopeState {
    #[serde(rename = "configInfo", default)]
    config_info: Option<ConfigInfo>,
}

enum SessionCell {
    Unloaded,
    Loaded(Option<ConfigInfo>),
}

/// Session configuration holder with read-through initialization.
///
/// Last writer wins; updates only come from a single user action.
pub struct ConfigStore {
    storage: Arc<dyn SessionStorage>,
    key: String,
    session: Mutex<SessionCell>,
}

impl ConfigStore {
    /// Create a store persisting under [`CONFIG_INFO_STORAGE_KEY`].
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            key: CONFIG_INFO_STORAGE_KEY.to_string(),
            session: Mutex::new(SessionCell::Unloaded),
        }
    }

    /// Current configuration, or `None` when nothing valid was saved.
    ///
    /// A storage read that fails is not cached; the next call retries it.
    pub fn read(&self) -> Option<ConfigInfo> {
        let mut cell = self.session.lock().unwrap_or_else(|e| e.into_inner());
        if let SessionCell::Loaded(info) = &*cell {
            return info.clone();
        }
        match self.load_persisted() {
            Ok(info) => {
                *cell = SessionCell::Loaded(info.clone());
                info
            }
            Err(err) => {
                warn!(?err, key = %self.key, "config storage unreadable; using defaults");
                None
            }
        }
    }

    /// Replace the configuration wholesale and persist it.
    ///
    /// The new value is visible to `read()` immediately, even if persisting fails.
    pub fn update(&self, info: ConfigInfo) {
        let envelope = ConfigEnvelope {
            state: ConfigEnvelopeState {
                config_info: Some(info.clone()),
            },
            version: 0,
        };
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = SessionCell::Loaded(Some(info));

        match serde_json::to_string(&envelope) {
            Ok(raw) => {
                if let Err(err) = self.storage.set_item(&self.key, &raw) {
                    warn!(?err, key = %self.key, "failed to persist config; keeping it for this session only");
                }
            }
            Err(err) => warn!(?err, "failed to encode config envelope"),
        }
    }

    /// Timeout to apply when a request does not override it.
    pub fn effective_timeout(&self) -> Duration {
        self.read().map_or_else(
            || Duration::from_millis(u64::from(DEFAULT_TIMEOUT_SECS) * 1000),
            |info| info.timeout(),
        )
    }

    /// Malformed envelopes load as `Ok(None)`; only storage failures are `Err`.
    fn load_persisted(&self) -> Result<Option<ConfigInfo>, StorageError> {
        let Some(raw) = self.storage.get_item(&self.key)? else {
            return Ok(None);
        };
        match serde_json::from_str::<ConfigEnvelope>(&raw) {
            Ok(envelope) => {
                debug!(key = %self.key, present = envelope.state.config_info.is_some(), "loaded session config");
                Ok(envelope.state.config_info)
            }
            Err(err) => {
                warn!(?err, key = %self.key, "malformed config envelope; using defaults");
                Ok(None)
            }
        }
    }
}

/// Editable values behind the configuration dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigForm {
    /// Timeout field, in seconds.
    pub timeout_secs: i64,
    /// Authorization field; empty means none.
    pub authorization: String,
}

impl ConfigForm {
    /// Initial values: the saved config, or the default timeout and no authorization.
    pub fn initial(store: &ConfigStore) -> Self {
        let current = store.read();
        Self {
            timeout_secs: i64::from(
                current
                    .as_ref()
                    .map_or(DEFAULT_TIMEOUT_SECS, ConfigInfo::timeout_secs),
            ),
            authorization: current
                .and_then(|c| c.authorization)
                .unwrap_or_default(),
        }
    }

    /// Validate, save, and confirm with a success toast.
    pub fn submit(
        self,
        store: &ConfigStore,
        notifier: &dyn Notifier,
    ) -> Result<ConfigInfo, ConfigError> {
        let info = ConfigInfo::new(self.timeout_secs, Some(self.authorization))?;
        store.update(info.clone());
        notifier.notify(
            ToastKind::Success,
            UPDATE_SUCCESS_MESSAGE,
            Duration::from_secs(3),
        );
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySessionStorage;
    use crate::toast::SharedToasts;

    fn store_with(raw: Option<&str>) -> (MemorySessionStorage, ConfigStore) {
        let storage = MemorySessionStorage::new();
        if let Some(raw) = raw {
            storage.set_item(CONFIG_INFO_STORAGE_KEY, raw).unwrap();
        }
        let store = ConfigStore::new(Arc::new(storage.clone()));
        (storage, store)
    }

    #[test]
    fn absent_storage_reads_none_and_defaults_timeout() {
        let (_, store) = store_with(None);
        assert!(store.read().is_none());
        assert_eq!(store.effective_timeout(), Duration::from_millis(120_000));
    }

    #[test]
    fn persisted_envelope_is_read() {
        let (_, store) = store_with(Some(
            r#"{"state":{"configInfo":{"timeout":30,"authorization":"Bearer t"}},"version":0}"#,
        ));
        let info = store.read().unwrap();
        assert_eq!(info.timeout_secs(), 30);
        assert_eq!(info.authorization(), Some("Bearer t"));
        assert_eq!(store.effective_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn null_config_info_reads_none() {
        let (_, store) = store_with(Some(r#"{"state":{"configInfo":null}}"#));
        assert!(store.read().is_none());
    }

    #[test]
    fn malformed_or_out_of_range_storage_reads_none() {
        for raw in [
            "not json",
            r#"{"state":{"configInfo":{"timeout":0}}}"#,
            r#"{"state":{"configInfo":{"timeout":3601}}}"#,
            r#"{"other":1}"#,
        ] {
            let (_, store) = store_with(Some(raw));
            assert!(store.read().is_none(), "expected None for {raw}");
        }
    }

    #[test]
    fn update_is_visible_immediately_and_persisted() {
        let (storage, store) = store_with(None);
        store.update(ConfigInfo::new(5, None).unwrap());
        assert_eq!(store.effective_timeout(), Duration::from_millis(5000));

        let raw = storage.get_item(CONFIG_INFO_STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["state"]["configInfo"]["timeout"], 5);
        assert!(value["state"]["configInfo"].get("authorization").is_none());

        // A second store over the same storage reads the persisted value.
        let reopened = ConfigStore::new(Arc::new(storage));
        assert_eq!(reopened.read().unwrap().timeout_secs(), 5);
    }

    #[test]
    fn update_replaces_whole_object() {
        let (_, store) = store_with(None);
        store.update(ConfigInfo::new(10, Some("token".into())).unwrap());
        store.update(ConfigInfo::new(20, None).unwrap());
        let info = store.read().unwrap();
        assert_eq!(info.timeout_secs(), 20);
        assert!(info.authorization().is_none());
    }

    #[test]
    fn timeout_bounds_are_enforced() {
        assert_eq!(
            ConfigInfo::new(0, None),
            Err(ConfigError::TimeoutOutOfRange(0))
        );
        assert_eq!(
            ConfigInfo::new(-3, None),
            Err(ConfigError::TimeoutOutOfRange(-3))
        );
        assert!(ConfigInfo::new(1, None).is_ok());
        assert!(ConfigInfo::new(3600, None).is_ok());
        assert!(ConfigInfo::new(3601, None).is_err());
    }

    #[test]
    fn empty_authorization_is_absent() {
        let info = ConfigInfo::new(60, Some(String::new())).unwrap();
        assert!(info.authorization().is_none());
    }

    #[test]
    fn form_starts_from_defaults_then_saved_values() {
        let (_, store) = store_with(None);
        let form = ConfigForm::initial(&store);
        assert_eq!(form.timeout_secs, 120);
        assert!(form.authorization.is_empty());

        store.update(ConfigInfo::new(45, Some("abc".into())).unwrap());
        let form = ConfigForm::initial(&store);
        assert_eq!(form.timeout_secs, 45);
        assert_eq!(form.authorization, "abc");
    }

    #[test]
    fn form_submit_updates_and_toasts() {
        let (_, store) = store_with(None);
        let toasts = SharedToasts::new(4);
        let form = ConfigForm {
            timeout_secs: 9,
            authorization: "Basic x".into(),
        };
        let info = form.submit(&store, &toasts).unwrap();
        assert_eq!(store.read(), Some(info));
        let visible = toasts.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].kind, ToastKind::Success);
    }

    #[test]
    fn form_submit_rejects_invalid_timeout_without_saving() {
        let (_, store) = store_with(None);
        let toasts = SharedToasts::new(4);
        let form = ConfigForm {
            timeout_secs: 0,
            authorization: String::new(),
        };
        assert!(form.submit(&store, &toasts).is_err());
        assert!(store.read().is_none());
        assert!(toasts.visible().is_empty());
    }
}
