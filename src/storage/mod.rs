// SPDX-License-Identifier: MPL-2.0
//! Durable key-value persistence.
//!
//! The session token and the locale preference must survive a restart.
//! Both stores talk to a [`KeyValueStore`] handed to them at construction,
//! so tests run against [`MemoryStore`] while the binary uses [`FileStore`].
//!
//! [`FileStore`] keeps every entry in a single CBOR document inside the
//! application data directory (see [`crate::app::paths`]). CBOR keeps this
//! runtime state apart from the user-editable `settings.toml`.

use crate::app::paths;
use crate::error::{Result, StorageError};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// State file name within the app data directory.
const STATE_FILE: &str = "state.cbor";

/// Well-known keys written by the core stores.
pub mod keys {
    /// Opaque token returned by the auth provider on sign-in.
    pub const SESSION_TOKEN: &str = "session.token";
    /// Language tag of the user's last explicit locale choice.
    pub const LOCALE_PREFERENCE: &str = "locale.preference";
}

/// Port for durable string storage.
///
/// Implementations must be safe to share between the session and locale
/// stores, hence `&self` receivers and the `Send + Sync` bound.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key was never set.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Clearing an absent key succeeds.
    fn clear(&self, key: &str) -> Result<()>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// MemoryStore
// =============================================================================

/// Volatile store, used in tests and when no data directory exists.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// CBOR-file backed store.
///
/// Every operation reads the file, applies the change and writes the whole
/// document back, so two `FileStore`s on the same directory (e.g. before and
/// after a simulated restart) always agree.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    io: Mutex<()>,
}

impl FileStore {
    /// Opens the store in the default data directory.
    pub fn open() -> Result<Self> {
        Self::open_in(None)
    }

    /// Opens the store in `base_dir`, or the resolved data directory when
    /// `None`.
    pub fn open_in(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut path =
            paths::get_app_data_dir_with_override(base_dir).ok_or(StorageError::NoDataDirectory)?;
        path.push(STATE_FILE);
        Ok(Self {
            path,
            io: Mutex::new(()),
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        if !self.path.exists() {
            return BTreeMap::new();
        }

        let decoded = fs::File::open(&self.path)
            .map_err(|e| StorageError::Decode(e.to_string()))
            .and_then(|file| {
                ciborium::from_reader(BufReader::new(file))
                    .map_err(|e| StorageError::Decode(e.to_string()))
            });

        match decoded {
            Ok(entries) => entries,
            Err(error) => {
                // An unreadable state file behaves like an empty one; the next
                // write replaces it.
                tracing::warn!(path = %self.path.display(), %error, "discarding unreadable state file");
                BTreeMap::new()
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(&self.path)?;
        ciborium::into_writer(entries, BufWriter::new(file))
            .map_err(|e| StorageError::Encode(e.to_string()))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = lock(&self.io);
        Ok(self.read_entries().remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = lock(&self.io);
        let mut entries = self.read_entries();
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn clear(&self, key: &str) -> Result<()> {
        let _guard = lock(&self.io);
        let mut entries = self.read_entries();
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}
