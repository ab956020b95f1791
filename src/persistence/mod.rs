//! Key/value storage port for progress data
//!
//! The simulation never touches storage directly. Hosts inject a
//! `ProgressStore`: `MemoryStore` natively and in tests, `LocalStorage` in
//! the browser.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::PersistenceError;

/// String key/value storage
pub trait ProgressStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);

    /// Bump a numeric counter, treating missing or garbled values as 0
    fn increment(&mut self, key: &str) -> u64 {
        let next = self
            .get(key)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0)
            .saturating_add(1);
        self.set(key, &next.to_string());
        next
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ProgressStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

/// Read a JSON value. `Ok(None)` when the key is absent.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn ProgressStore,
    key: &str,
) -> Result<Option<T>, PersistenceError> {
    let Some(json) = store.get(key) else {
        return Ok(None);
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|source| PersistenceError::Corrupt {
            key: key.to_string(),
            source,
        })
}

pub fn save_json<T: Serialize>(
    store: &mut dyn ProgressStore,
    key: &str,
    value: &T,
) -> Result<(), PersistenceError> {
    let json = serde_json::to_string(value).map_err(|source| PersistenceError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json);
    Ok(())
}

/// Browser LocalStorage. Storage failures (quota, private mode) are logged
/// and otherwise ignored.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl ProgressStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        match Self::storage() {
            Some(storage) => {
                if storage.set_item(key, value).is_err() {
                    log::warn!("Failed to write {key} to LocalStorage");
                }
            }
            None => log::warn!("LocalStorage unavailable; {key} not saved"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_counts_from_zero() {
        let mut store = MemoryStore::new();
        assert_eq!(store.increment("runs"), 1);
        assert_eq!(store.increment("runs"), 2);
        assert_eq!(store.get("runs").as_deref(), Some("2"));

        store.set("runs", "garbage");
        assert_eq!(store.increment("runs"), 1);
    }

    #[test]
    fn test_json_helpers() {
        let mut store = MemoryStore::new();
        assert_eq!(load_json::<Vec<u32>>(&store, "k").unwrap(), None);
        save_json(&mut store, "k", &vec![1u32, 2, 3]).unwrap();
        assert_eq!(load_json::<Vec<u32>>(&store, "k").unwrap(), Some(vec![1, 2, 3]));

        store.set("k", "{not json");
        let err = load_json::<Vec<u32>>(&store, "k").unwrap_err();
        assert!(matches!(err, PersistenceError::Corrupt { ref key, .. } if key == "k"));
    }
}
