use std::fmt;

use common::EquatableNoop;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::errors::StorageError;
use crate::storage::{shared, SafetyStorageExt, SharedStorage};

/// A value bound to one key of one store, cached in memory.
///
/// The store is read once, on construction; a missing or unreadable value
/// falls back to `default_value`, and the resulting value is written back so
/// the slot always holds what this instance reports. Reads return the
/// in-memory copy. Writes
/// update the copy first and then persist; a failed persist is logged and
/// dropped, so the copy stays the source of truth for this instance.
///
/// Two instances backed by the same key can drift apart: each keeps its own
/// copy, and the store is last-writer-wins. Share one instance (for example
/// behind a `Mutex`) when several threads need a consistent view.
///
/// Equality compares key, default and current value; the store is ignored.
#[derive(Clone, PartialEq, Eq)]
pub struct StorableValue<T> {
    key: String,
    default_value: T,
    storage: EquatableNoop<SharedStorage>,
    in_memory: T,
}

impl<T> StorableValue<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn new(key: impl Into<String>, default_value: T, storage: SharedStorage) -> Self {
        let key = key.into();
        let in_memory = match storage.load::<T>(&key) {
            Ok(Some(v)) => v,
            Ok(None) => default_value.clone(),
            Err(e) => {
                warn!(%key, error = %e, "stored value unreadable, using default");
                default_value.clone()
            }
        };
        let value = Self { key, default_value, storage: EquatableNoop::new(storage), in_memory };
        value.persist();
        value
    }

    /// Bind to a key given as an enumeration (or anything else that reads as a string).
    pub fn from_key<K: AsRef<str>>(key: K, default_value: T, storage: SharedStorage) -> Self {
        Self::new(key.as_ref(), default_value, storage)
    }

    /// Bind to the process-wide store; fails if none is installed.
    pub fn with_shared(key: impl Into<String>, default_value: T) -> Result<Self, StorageError> {
        Ok(Self::new(key, default_value, shared::shared()?))
    }

    pub fn get(&self) -> &T {
        &self.in_memory
    }

    pub fn value(&self) -> T {
        self.in_memory.clone()
    }

    pub fn set(&mut self, value: T) {
        self.in_memory = value;
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.in_memory, &self.key) {
            warn!(key = %self.key, error = %e, "persist failed, keeping in-memory value");
        }
    }
}

impl<T> StorableValue<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }
}

impl<T: fmt::Debug> fmt::Debug for StorableValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorableValue")
            .field("key", &self.key)
            .field("default_value", &self.default_value)
            .field("value", &self.in_memory)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::storage::memory_store::MemoryStore;
    use crate::test_support::FailingStore;

    #[derive(Debug)]
    enum Key {
        LaunchCount,
    }

    impl AsRef<str> for Key {
        fn as_ref(&self) -> &str {
            match self {
                Key::LaunchCount => "launch_count",
            }
        }
    }

    #[test]
    fn starts_from_default_when_store_is_empty() {
        let store: SharedStorage = Arc::new(MemoryStore::new());
        let v = StorableValue::new("count", 0u32, store);
        assert_eq!(*v.get(), 0);
        assert_eq!(v.default_value(), &0);
    }

    #[test]
    fn starts_from_stored_value() -> Result<(), anyhow::Error> {
        let store: SharedStorage = Arc::new(MemoryStore::new());
        store.save(&3u32, "launch_count")?;
        let v = StorableValue::from_key(Key::LaunchCount, 0u32, store);
        assert_eq!(v.key(), "launch_count");
        assert_eq!(v.value(), 3);
        Ok(())
    }

    #[test]
    fn undecodable_value_falls_back_to_default() -> Result<(), anyhow::Error> {
        let store: SharedStorage = Arc::new(MemoryStore::new());
        store.save_string(Some("not json"), "count")?;
        store.save(&"text", "other")?;
        assert_eq!(StorableValue::new("count", 1u32, store.clone()).value(), 1);
        assert_eq!(StorableValue::new("other", 2u32, store).value(), 2);
        Ok(())
    }

    #[test]
    fn construction_writes_the_initial_value_back() -> Result<(), anyhow::Error> {
        let store: SharedStorage = Arc::new(MemoryStore::new());

        // absent slot gets the default
        let _v = StorableValue::new("count", 7u32, store.clone());
        assert_eq!(store.load::<u32>("count")?, Some(7));

        // undecodable slot is replaced by the default
        store.save(&"junk", "other")?;
        let _v = StorableValue::new("other", 3u32, store.clone());
        assert_eq!(store.load::<u32>("other")?, Some(3));

        // a readable slot keeps its value
        store.save(&11u32, "kept")?;
        let v = StorableValue::new("kept", 0u32, store.clone());
        assert_eq!(v.value(), 11);
        assert_eq!(store.load::<u32>("kept")?, Some(11));
        Ok(())
    }

    #[test]
    fn construction_survives_a_rejecting_store() {
        let failing = Arc::new(FailingStore::new());
        failing.fail_writes(true);
        let v = StorableValue::new("count", 4u32, failing.clone());
        assert_eq!(v.value(), 4);
    }

    #[test]
    fn reads_do_not_go_back_to_the_store() -> Result<(), anyhow::Error> {
        let store: SharedStorage = Arc::new(MemoryStore::new());
        let v = StorableValue::new("count", 0u32, store.clone());
        store.save(&42u32, "count")?;
        assert_eq!(v.value(), 0);
        Ok(())
    }

    #[test]
    fn write_survives_failed_persist() -> Result<(), anyhow::Error> {
        let failing = Arc::new(FailingStore::new());
        let store: SharedStorage = failing.clone();
        let mut v = StorableValue::new("count", 0u32, store.clone());

        v.set(5);
        assert_eq!(store.load::<u32>("count")?, Some(5));

        failing.fail_writes(true);
        v.set(9);
        assert_eq!(v.value(), 9);
        assert_eq!(store.load::<u32>("count")?, Some(5));
        Ok(())
    }

    #[test]
    fn equality_ignores_the_store() {
        let a = StorableValue::new("k", 1u8, Arc::new(MemoryStore::new()));
        let b = StorableValue::new("k", 1u8, Arc::new(FailingStore::new()));
        assert_eq!(a, b);

        let mut c = b.clone();
        c.set(2);
        assert_ne!(a, c);
        assert_ne!(a, StorableValue::new("other", 1u8, Arc::new(MemoryStore::new())));

        // same key and current value, different default
        let mut d = StorableValue::new("k", 0u8, Arc::new(MemoryStore::new()));
        d.set(1);
        assert_ne!(a, d);
    }
}
