//! Key-value storage capability for persisted client state.
//!
//! The conversation store never touches the filesystem directly; it is
//! handed a [`KeyValueStore`] so tests can substitute [`MemoryStore`].

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// The entry exists but cannot be decoded as text.
    #[error("Corrupt value under {key}")]
    Corrupt { key: String },
}

/// Minimal string key-value interface.
pub trait KeyValueStore: Send {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a single entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self { entries }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File-backed store: one `<key>.json` file per key inside a directory.
#[derive(Debug)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a new `FileStore`.
    /// Creates the base directory if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Path of the file backing `key`.
    pub fn entry_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_path(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        String::from_utf8(bytes).map(Some).map_err(|_| StorageError::Corrupt {
            key: key.to_string(),
        })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        atomic_write(&path, value.as_bytes())?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Validate a key for filesystem safety.
fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key cannot be empty".to_string()));
    }

    for ch in key.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '-' && ch != '_' {
            return Err(StorageError::InvalidKey(format!(
                "key contains invalid character: {ch}"
            )));
        }
    }

    Ok(())
}

/// Write content atomically using temp file + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let pid = std::process::id();

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("entry");
    let tmp_path = path.with_file_name(format!("{file_name}.{timestamp}.{pid}.tmp"));

    let result = (|| {
        let mut file = File::create(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_file_store() -> (TempDir, FileStore) {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("data")).unwrap();
        (temp, store)
    }

    #[test]
    fn test_memory_store_basic() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert!(store.contains("k"));

        store.remove("k").unwrap();
        assert!(!store.contains("k"));
        store.remove("k").unwrap();
    }

    #[test]
    fn test_new_creates_directory() {
        let (temp, store) = setup_file_store();
        assert!(temp.path().join("data").is_dir());
        assert_eq!(
            store.entry_path("k").unwrap(),
            temp.path().join("data").join("k.json")
        );
    }

    #[test]
    fn test_file_store_roundtrip() {
        let (_temp, mut store) = setup_file_store();
        assert_eq!(store.get("chatHistory").unwrap(), None);

        store.set("chatHistory", "[1,2,3]").unwrap();
        assert_eq!(store.get("chatHistory").unwrap().as_deref(), Some("[1,2,3]"));

        store.set("chatHistory", "[]").unwrap();
        assert_eq!(store.get("chatHistory").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let mut store = FileStore::new(temp.path()).unwrap();
            store.set("k", "persisted").unwrap();
        }
        let store = FileStore::new(temp.path()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_file_store_remove() {
        let (_temp, mut store) = setup_file_store();
        store.set("k", "v").unwrap();
        let path = store.entry_path("k").unwrap();
        assert!(path.exists());

        store.remove("k").unwrap();
        assert!(!path.exists());

        // Missing key is fine
        store.remove("k").unwrap();
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let (temp, mut store) = setup_file_store();
        store.set("k", "v").unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp.path().join("data"))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_non_utf8_entry_is_corrupt() {
        let (_temp, mut store) = setup_file_store();
        let path = store.entry_path("k").unwrap();
        fs::write(&path, [0xff, 0xfe, b'[', b']']).unwrap();

        assert!(matches!(
            store.get("k"),
            Err(StorageError::Corrupt { ref key }) if key == "k"
        ));
        store.remove("k").unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let (_temp, mut store) = setup_file_store();
        assert!(matches!(store.get(""), Err(StorageError::InvalidKey(_))));
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.remove("a/b"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
