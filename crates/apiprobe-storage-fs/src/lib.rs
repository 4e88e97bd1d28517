// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem-backed `SessionStorage` for command-line hosts.
//!
//! A CLI invocation is too short-lived to be a session on its own, so the
//! session lives in a directory instead; removing the directory ends it.

use apiprobe_app_core::storage::{SessionStorage, StorageError};
use directories::ProjectDirs;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Store each item as `<key>.json` under a session directory.
pub struct FsSessionStorage {
    base: PathBuf,
}

impl FsSessionStorage {
    /// Create a store under the platform data directory (e.g. `~/.local/share/apiprobe/session`).
    pub fn new() -> Result<Self, StorageError> {
        let proj = ProjectDirs::from("dev", "flyingrobots", "apiprobe")
            .ok_or_else(|| StorageError::Other("could not resolve data dir".into()))?;
        Self::at(proj.data_local_dir().join("session"))
    }

    /// Create a store rooted at `base`, creating it if needed.
    pub fn at(base: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base = base.into();
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    /// Directory holding the session's items.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StorageError::Other(format!("invalid storage key: {key:?}")));
        }
        Ok(self.base.join(format!("{key}.json")))
    }
}

impl SessionStorage for FsSessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, value)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }
}
