//! Durable key-value storage behind the note store.
//!
//! `KeyValueStore` plays the role of the browser's local storage: string keys
//! mapped to JSON-encoded string values. The store is injected, so tests use
//! `MemoryStorage` and durable sessions use `SledStorage`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;

/// Key holding the JSON array of notes.
pub const NOTES_KEY: &str = "notes";
/// Key holding the JSON boolean sort preference.
pub const SORT_KEY: &str = "isLatestFirst";
/// Key holding the JSON-encoded bearer token.
pub const TOKEN_KEY: &str = "token";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("value under '{0}' is not valid UTF-8")]
    NotUtf8(String),

    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Load/save port for client-side state.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

// ============================================================================
// In-memory
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// Sled
// ============================================================================

/// On-disk storage backed by a sled database.
#[derive(Clone)]
pub struct SledStorage {
    db: sled::Db,
}

impl SledStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self {
            db: sled::open(path)?,
        })
    }

    pub fn from_db(db: sled::Db) -> Self {
        Self { db }
    }
}

impl KeyValueStore for SledStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|_| StorageError::NotUtf8(key.to_string())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.db.remove(key.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_sled() -> SledStorage {
        let db = sled::Config::new().temporary(true).open().unwrap();
        SledStorage::from_db(db)
    }

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(NOTES_KEY).unwrap(), None);

        storage.set(NOTES_KEY, "[]").unwrap();
        assert_eq!(storage.get(NOTES_KEY).unwrap().as_deref(), Some("[]"));

        storage.remove(NOTES_KEY).unwrap();
        assert_eq!(storage.get(NOTES_KEY).unwrap(), None);
    }

    #[test]
    fn test_sled_storage_overwrites_value() {
        let storage = temp_sled();
        storage.set(SORT_KEY, "true").unwrap();
        storage.set(SORT_KEY, "false").unwrap();
        assert_eq!(storage.get(SORT_KEY).unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn test_sled_storage_rejects_non_utf8() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        db.insert(TOKEN_KEY.as_bytes(), vec![0xff, 0xfe]).unwrap();
        let storage = SledStorage::from_db(db);
        assert!(matches!(
            storage.get(TOKEN_KEY),
            Err(StorageError::NotUtf8(_))
        ));
    }
}
