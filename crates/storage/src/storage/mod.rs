//! Storage abstractions for values persisted under string keys.
//!
//! `SafetyStorage` is the object-safe capability every backend implements;
//! `SafetyStorageExt` layers typed `save`/`load` on top of it through the JSON
//! codec so callers can hold an `Arc<dyn SafetyStorage>` and still work with
//! their own types.

pub mod json_file_store;
pub mod memory_store;
pub mod shared;

use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::codec;
use crate::errors::StorageError;

/// Capability of a place that can durably hold named values.
/// Implementations can be in-memory, file-backed, or remote KV.
///
/// Structured bytes and plain strings share one key namespace: a slot holds
/// one or the other, and reading it through the other accessor yields `None`.
/// Removing an absent key is not an error.
pub trait SafetyStorage: Send + Sync {
    fn save_data(&self, key: &str, data: Vec<u8>) -> Result<(), StorageError>;
    fn load_data(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// `None` removes the key.
    fn save_string(&self, value: Option<&str>, key: &str) -> Result<(), StorageError>;
    fn load_string(&self, key: &str) -> Result<Option<String>, StorageError>;
}

/// Typed access for any `SafetyStorage`, trait objects included.
pub trait SafetyStorageExt: SafetyStorage {
    fn save<T: Serialize + ?Sized>(&self, value: &T, key: &str) -> Result<(), StorageError> {
        let data = codec::encode(value)?;
        self.save_data(key, data)
    }

    /// Absent keys yield `Ok(None)`; bytes that do not decode into `T` are a
    /// `StorageError::Decoding`.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        self.load_data(key)?
            .map(|bytes| codec::decode(key, &bytes))
            .transpose()
    }
}

impl<S: SafetyStorage + ?Sized> SafetyStorageExt for S {}

/// Shared storage reference
pub type SharedStorage = Arc<dyn SafetyStorage>;

/// One slot of a key-value backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Entry {
    Data(Vec<u8>),
    String(String),
}

impl Entry {
    pub(crate) fn data(&self) -> Option<Vec<u8>> {
        match self {
            Entry::Data(bytes) => Some(bytes.clone()),
            Entry::String(_) => None,
        }
    }

    pub(crate) fn string(&self) -> Option<String> {
        match self {
            Entry::String(s) => Some(s.clone()),
            Entry::Data(_) => None,
        }
    }
}
