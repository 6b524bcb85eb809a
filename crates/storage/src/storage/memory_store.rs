use std::{collections::HashMap, sync::Mutex};

use super::{Entry, SafetyStorage};
use crate::errors::StorageError;

/// In-memory store for tests and the `memory` backend.
/// Every operation runs under one lock, so concurrent callers see each
/// write in full or not at all.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> Result<usize, StorageError> {
        self.with_entries(|m| m.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        self.with_entries(|m| m.is_empty())
    }

    fn with_entries<R>(&self, f: impl FnOnce(&mut HashMap<String, Entry>) -> R) -> Result<R, StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::poisoned())?;
        Ok(f(&mut entries))
    }
}

impl SafetyStorage for MemoryStore {
    fn save_data(&self, key: &str, data: Vec<u8>) -> Result<(), StorageError> {
        self.with_entries(|m| {
            m.insert(key.to_string(), Entry::Data(data));
        })
    }

    fn load_data(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.with_entries(|m| m.get(key).and_then(Entry::data))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.with_entries(|m| {
            m.remove(key);
        })
    }

    fn save_string(&self, value: Option<&str>, key: &str) -> Result<(), StorageError> {
        match value {
            Some(s) => self.with_entries(|m| {
                m.insert(key.to_string(), Entry::String(s.to_string()));
            }),
            None => self.remove(key),
        }
    }

    fn load_string(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_entries(|m| m.get(key).and_then(Entry::string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SafetyStorageExt;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        age: u32,
    }

    #[test]
    fn memory_store_crud() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        assert!(store.is_empty()?);

        let p = Profile { name: "alice".into(), age: 30 };
        store.save(&p, "profile")?;
        assert_eq!(store.load::<Profile>("profile")?, Some(p));
        assert_eq!(store.len()?, 1);

        store.remove("profile")?;
        assert_eq!(store.load::<Profile>("profile")?, None);
        // removing again is a no-op
        store.remove("profile")?;
        assert!(store.is_empty()?);
        Ok(())
    }

    #[test]
    fn strings_and_data_share_the_key_space() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        store.save_string(Some("hello"), "greeting")?;
        assert_eq!(store.load_string("greeting")?.as_deref(), Some("hello"));
        // a string slot is not structured data
        assert_eq!(store.load_data("greeting")?, None);

        store.save(&42u32, "greeting")?;
        assert_eq!(store.load_string("greeting")?, None);
        assert_eq!(store.load::<u32>("greeting")?, Some(42));
        assert_eq!(store.len()?, 1);
        Ok(())
    }

    #[test]
    fn load_surfaces_decode_failures() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        store.save(&"text", "count")?;
        assert!(matches!(store.load::<u32>("count"), Err(StorageError::Decoding { .. })));
        Ok(())
    }

    #[test]
    fn poisoned_lock_is_an_error_not_an_empty_store() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.save_string(Some("v"), "k").unwrap();

        let poisoner = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(StorageError::Storage(_))));
        assert!(matches!(store.is_empty(), Err(StorageError::Storage(_))));
        assert!(matches!(store.load_string("k"), Err(StorageError::Storage(_))));
    }
}
