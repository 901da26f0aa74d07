//! Key/value media backing the admin store.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store only ever needs synchronous string get/set/remove, the shape of
//! browser `localStorage`. Each medium here provides that shape for a
//! different host: process memory, a JSON file, or the browser itself.
//!
//! ERROR HANDLING
//! ==============
//! Writes are best-effort. A medium that cannot persist (quota, I/O) logs a
//! warning and keeps going, so a storage hiccup never breaks page flow.
//! Opening is strict: a file medium that exists but cannot be parsed is an
//! error, never an empty medium that would overwrite it on the next write.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::config::StoreConfig;

/// Synchronous string-keyed storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local medium. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}

// =============================================================================
// JSON FILE
// =============================================================================

/// File-backed medium: a flat JSON object, rewritten on every mutation.
#[derive(Debug)]
pub struct JsonFileStorage {
    entries: Mutex<HashMap<String, String>>,
    file_path: PathBuf,
}

impl JsonFileStorage {
    /// Open the medium at `path`. A missing file starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, or is not a
    /// JSON object of string values. The file is left untouched so data the
    /// medium does not understand is never overwritten.
    pub fn open<P: Into<PathBuf>>(path: P) -> std::io::Result<Self> {
        let file_path = path.into();
        let entries = match std::fs::read(&file_path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e),
        };
        Ok(Self { entries: Mutex::new(entries), file_path })
    }

    /// Open the medium at `config.storage_path`.
    ///
    /// # Errors
    ///
    /// See [`JsonFileStorage::open`].
    pub fn from_config(config: &StoreConfig) -> std::io::Result<Self> {
        Self::open(config.storage_path.clone())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn mutate(&self, f: impl FnOnce(&mut HashMap<String, String>)) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut entries);
        if let Err(e) = write_map(&self.file_path, &entries) {
            warn!(error = %e, path = %self.file_path.display(), "storage write failed");
        }
    }
}

fn write_map(path: &Path, entries: &HashMap<String, String>) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec(entries).map_err(std::io::Error::other)?;
    std::fs::write(path, data)
}

impl KeyValueStore for JsonFileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.mutate(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        });
    }

    fn remove(&self, key: &str) {
        self.mutate(|entries| {
            entries.remove(key);
        });
    }
}

// =============================================================================
// BROWSER
// =============================================================================

/// `window.localStorage`. Reads return `None` and writes no-op when the
/// storage object is unavailable (private mode, SSR).
#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

#[cfg(feature = "hydrate")]
impl BrowserStorage {
    fn local_storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(feature = "hydrate")]
impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::local_storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        let Some(storage) = Self::local_storage() else {
            return;
        };
        if storage.set_item(key, value).is_err() {
            warn!(key, "localStorage write rejected");
        }
    }

    fn remove(&self, key: &str) {
        let Some(storage) = Self::local_storage() else {
            return;
        };
        if storage.remove_item(key).is_err() {
            warn!(key, "localStorage remove rejected");
        }
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
