//! Durable client-side key/value storage.

mod preferences;

pub use preferences::{UiPreferences, SIDEBAR_COLLAPSED_KEY};

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

/// Minimal string store in the spirit of browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, KeyValueError>;
    fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError>;
    fn delete(&self, key: &str) -> Result<(), KeyValueError>;
}

#[derive(Debug, thiserror::Error)]
pub enum KeyValueError {
    #[error("storage io failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage file {path} is not a JSON object: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Process-local store used by tests and the demo.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
        let guard = self.entries.lock().map_err(|_| KeyValueError::Poisoned)?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError> {
        let mut guard = self.entries.lock().map_err(|_| KeyValueError::Poisoned)?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), KeyValueError> {
        let mut guard = self.entries.lock().map_err(|_| KeyValueError::Poisoned)?;
        guard.remove(key);
        Ok(())
    }
}

/// All keys live in one JSON object on disk; every write replaces the file.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub const FILE_NAME: &'static str = "local-storage.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store backed by `<dir>/local-storage.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, KeyValueError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(KeyValueError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(|source| KeyValueError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), KeyValueError> {
        let io_error = |source| KeyValueError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let encoded = serde_json::to_string_pretty(entries).map_err(|source| {
            KeyValueError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        // Write a sibling file and rename it over the old one so a torn write never
        // replaces the last good copy.
        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp).map_err(io_error)?;
            file.write_all(encoded.as_bytes()).map_err(io_error)?;
            file.sync_all().map_err(io_error)?;
        }
        fs::rename(&tmp, &self.path).map_err(io_error)
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(Self::FILE_NAME);
        self.path
            .with_file_name(format!(".{name}.tmp.{}", std::process::id()))
    }

    /// Unreadable content is discarded on write rather than blocking every later write.
    fn entries_for_write(&self) -> Result<BTreeMap<String, String>, KeyValueError> {
        match self.read_entries() {
            Err(KeyValueError::Corrupt { path, source }) => {
                warn!(path = %path.display(), error = %source, "discarding corrupt storage file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
        let _guard = self.lock.lock().map_err(|_| KeyValueError::Poisoned)?;
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError> {
        let _guard = self.lock.lock().map_err(|_| KeyValueError::Poisoned)?;
        let mut entries = self.entries_for_write()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn delete(&self, key: &str) -> Result<(), KeyValueError> {
        let _guard = self.lock.lock().map_err(|_| KeyValueError::Poisoned)?;
        let mut entries = self.entries_for_write()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_and_deletes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileKeyValueStore::in_dir(dir.path().join("nested"));

        assert_eq!(store.get("missing").expect("read succeeds"), None);
        store.set("alpha", "1").expect("write succeeds");
        store.set("beta", "two").expect("write succeeds");
        assert_eq!(store.get("alpha").expect("read"), Some("1".to_string()));

        store.delete("alpha").expect("delete succeeds");
        assert_eq!(store.get("alpha").expect("read"), None);
        assert_eq!(store.get("beta").expect("read"), Some("two".to_string()));

        let reopened = FileKeyValueStore::new(store.path());
        assert_eq!(reopened.get("beta").expect("read"), Some("two".to_string()));
    }

    #[test]
    fn corrupt_file_fails_reads_but_recovers_on_write() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileKeyValueStore::in_dir(dir.path());
        fs::write(store.path(), "{not json").expect("seed corrupt file");

        assert!(matches!(
            store.get("alpha"),
            Err(KeyValueError::Corrupt { .. })
        ));

        store.set("alpha", "1").expect("write recovers");
        assert_eq!(store.get("alpha").expect("read"), Some("1".to_string()));
    }

    #[test]
    fn interrupted_write_leaves_the_previous_file_intact() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileKeyValueStore::in_dir(dir.path());
        store.set(SIDEBAR_COLLAPSED_KEY, "true").expect("set");

        // A crash mid-write leaves only a torn sibling behind.
        fs::write(store.temp_path(), "{\"sidebarColl").expect("seed torn temp file");
        assert_eq!(
            store.get(SIDEBAR_COLLAPSED_KEY).expect("read"),
            Some("true".to_string())
        );

        store.set("alpha", "1").expect("write");
        assert_eq!(
            store.get(SIDEBAR_COLLAPSED_KEY).expect("read"),
            Some("true".to_string())
        );
        assert!(!store.temp_path().exists());

        let names: Vec<String> = fs::read_dir(dir.path())
            .expect("list dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![FileKeyValueStore::FILE_NAME.to_string()]);
    }

    #[test]
    fn memory_store_overwrites_last_write_wins() {
        let store = MemoryKeyValueStore::new();
        store.set("key", "first").expect("set");
        store.set("key", "second").expect("set");
        assert_eq!(store.get("key").expect("get"), Some("second".to_string()));
        store.delete("key").expect("delete");
        store.delete("key").expect("delete is idempotent");
        assert_eq!(store.get("key").expect("get"), None);
    }
}
