//! Client-local key-value persistence.
//!
//! Everything the console remembers between runs (bearer token, profile,
//! remembered username, sidebar preference) goes through [`KeyValueStore`].
//!
//! - [`MemoryStore`]: process-local, used by tests and short-lived sessions
//! - [`FileStore`]: a JSON object on disk, rewritten on every change

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Storage key for the bearer token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Storage key for the JSON-encoded user profile.
pub const USER_DATA_KEY: &str = "user_data";
/// Storage key for the login form's remembered username.
pub const REMEMBERED_USERNAME_KEY: &str = "remembered_username";
/// Storage key for the sidebar collapsed preference (`"true"` / `"false"`).
pub const SIDEBAR_COLLAPSED_KEY: &str = "sidebarCollapsed";

/// String key-value storage with `localStorage` semantics.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; the file and
    /// its parent directory are created on first write.
    ///
    /// A file that is not a JSON object is logged and read as empty; the next
    /// write replaces it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(
                    name: "storage.file.corrupt",
                    path = %path.display(),
                    error = %e,
                    "State file unreadable, starting empty"
                );
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(Error::Storage(format!("{}: {e}", path.display()))),
        };
        debug!(
            name: "storage.file.opened",
            path = %path.display(),
            keys = entries.len(),
            "State file opened"
        );
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("{}: {e}", parent.display())))?;
        }
        let json = serde_json::to_vec_pretty(entries)?;

        // Write beside the target and rename over it, so readers see either
        // the old file or the new one.
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        std::fs::write(&staging, json)
            .map_err(|e| Error::Storage(format!("{}: {e}", staging.display())))?;
        std::fs::rename(&staging, &self.path)
            .map_err(|e| Error::Storage(format!("{}: {e}", self.path.display())))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(key.to_string(), value.to_string());
        self.flush(&guard)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if guard.remove(key).is_some() {
            self.flush(&guard)?;
        }
        Ok(())
    }
}
