//! Key/value storage collaborator
//!
//! The simulation never touches storage directly. Controllers that need to
//! persist something (the tutorial-completed flag, day records, upgrade
//! levels) are handed a [`KeyValueStore`] at construction time.
//!
//! Backends:
//! - [`MemoryStore`]: in-process map (native, tests)
//! - [`LocalStore`]: browser LocalStorage (wasm32 only)

use std::collections::HashMap;

/// Storage key for the tutorial-completed flag
pub const TUTORIAL_COMPLETED_KEY: &str = "waffle_tutorial_completed";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend unavailable")]
    Unavailable,
    #[error("write rejected for key {0}")]
    WriteRejected(String),
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
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

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    pub fn new() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable - progress will not persist");
        }
        Self { storage }
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage
            .as_ref()
            .and_then(|s| s.get_item(key).ok())
            .flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|_| StorageError::WriteRejected(key.to_string()))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage
            .remove_item(key)
            .map_err(|_| StorageError::WriteRejected(key.to_string()))
    }
}

/// Whether the player has finished (or skipped) the tutorial
pub fn is_tutorial_completed(store: &dyn KeyValueStore) -> bool {
    store.get(TUTORIAL_COMPLETED_KEY).as_deref() == Some("true")
}

pub fn mark_tutorial_completed(store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
    store.set(TUTORIAL_COMPLETED_KEY, "true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a"), None);
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn test_tutorial_flag() {
        let mut store = MemoryStore::new();
        assert!(!is_tutorial_completed(&store));
        mark_tutorial_completed(&mut store).unwrap();
        assert!(is_tutorial_completed(&store));
    }

    #[test]
    fn test_borrowed_store_writes_through() {
        let mut store = MemoryStore::new();
        {
            let mut borrowed = &mut store;
            mark_tutorial_completed(&mut borrowed).unwrap();
        }
        assert!(is_tutorial_completed(&store));
    }
}
