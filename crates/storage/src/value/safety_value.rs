use std::fmt;

use common::EquatableNoop;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::errors::StorageError;
use crate::storage::{shared, SafetyStorageExt, SharedStorage};

/// A value bound to one key of one store, without a cache.
///
/// Every `get` goes to the store; absent, undecodable and unreadable values
/// all read as the default. `set` persists and logs failures instead of
/// returning them. Prefer `StorableValue` when reads are frequent.
#[derive(Clone, PartialEq, Eq)]
pub struct SafetyValue<T> {
    key: String,
    default_value: T,
    storage: EquatableNoop<SharedStorage>,
}

impl<T> SafetyValue<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn new(key: impl Into<String>, default_value: T, storage: SharedStorage) -> Self {
        Self { key: key.into(), default_value, storage: EquatableNoop::new(storage) }
    }

    pub fn from_key<K: AsRef<str>>(key: K, default_value: T, storage: SharedStorage) -> Self {
        Self::new(key.as_ref(), default_value, storage)
    }

    pub fn with_shared(key: impl Into<String>, default_value: T) -> Result<Self, StorageError> {
        Ok(Self::new(key, default_value, shared::shared()?))
    }

    pub fn get(&self) -> T {
        match self.storage.load::<T>(&self.key) {
            Ok(Some(v)) => v,
            Ok(None) => self.default_value.clone(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "stored value unreadable, using default");
                self.default_value.clone()
            }
        }
    }

    pub fn set(&self, value: &T) {
        if let Err(e) = self.storage.save(value, &self.key) {
            warn!(key = %self.key, error = %e, "persist failed");
        }
    }
}

impl<T> SafetyValue<T> {
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

impl<T: fmt::Debug> fmt::Debug for SafetyValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafetyValue")
            .field("key", &self.key)
            .field("default_value", &self.default_value)
            .finish_non_exhaustive()
    }
}
