// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared session services for apiprobe (storage port, session config, toasts, menus).
//! Keeps the request and import layers free of any host/UI framework.

pub mod config_info;
pub mod menu;
pub mod storage;
pub mod toast;

pub use config_info::{
    ConfigError, ConfigForm, ConfigInfo, ConfigStore, CONFIG_INFO_STORAGE_KEY,
    DEFAULT_TIMEOUT_SECS, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS,
};
pub use menu::{header_menu, HeaderAction, HeaderEffect, MenuItem, Navigator, SERVICE_SELECT_ROUTE};
pub use storage::{MemorySessionStorage, SessionStorage, StorageError};
pub use toast::{Notifier, SharedToasts, ToastKind, ToastService};
