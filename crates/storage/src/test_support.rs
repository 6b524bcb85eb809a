//! Stub stores for exercising failure paths.
//!
//! Compiled for this crate's own tests and behind the `test-support` feature.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::StorageError;
use crate::storage::{memory_store::MemoryStore, SafetyStorage};

/// A `MemoryStore` whose writes (saves and removes) can be switched to fail,
/// standing in for a medium that rejects writes (full disk, read-only mount).
/// Reads always succeed.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Storage(format!("write rejected for key `{key}`")));
        }
        Ok(())
    }
}

impl SafetyStorage for FailingStore {
    fn save_data(&self, key: &str, data: Vec<u8>) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.save_data(key, data)
    }

    fn load_data(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.load_data(key)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.remove(key)
    }

    fn save_string(&self, value: Option<&str>, key: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.save_string(value, key)
    }

    fn load_string(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.load_string(key)
    }
}
