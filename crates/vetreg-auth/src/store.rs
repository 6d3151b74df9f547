//! Key-value storage, the browser-storage analog.

use std::collections::HashMap;
use std::sync::RwLock;

/// Key-value storage errors.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    /// Backend storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Synchronous string key-value store.
///
/// Models the page's local storage: small values, synchronous access,
/// durable across page lifecycles.
pub trait KeyValueStore: Send + Sync {
    /// Get a value.
    fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Set a value, overwriting any existing one.
    fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// Remove a value; missing keys are not an error.
    fn remove(&self, key: &str) -> Result<(), KvError>;
}

/// In-memory key-value store.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| KvError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| KvError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| KvError::Storage(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryKeyValueStore::new();
        assert!(store.get("k").unwrap().is_none());

        store.set("k", "v1").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v1"));

        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));

        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
        store.remove("k").unwrap();
    }
}
