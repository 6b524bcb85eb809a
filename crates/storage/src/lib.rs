//! Key-value persistence behind a small capability trait.
//! - `storage`: the `SafetyStorage` trait, its in-memory and JSON file
//!   backends, and the process-wide shared store.
//! - `value`: `StorableValue` / `SafetyValue`, typed accessors bound to one key
//!   that never surface storage errors.
//! - `open` builds the backend a `configs::StorageConfig` asks for.

pub mod codec;
pub mod errors;
pub mod storage;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod value;

use std::sync::Arc;

use configs::{StorageBackend, StorageConfig};
use tracing::info;

pub use errors::StorageError;
pub use crate::storage::{
    json_file_store::JsonFileStore, memory_store::MemoryStore, SafetyStorage, SafetyStorageExt, SharedStorage,
};
pub use value::{SafetyValue, StorableValue};

/// Open the backend selected by `cfg`.
pub fn open(cfg: &StorageConfig) -> Result<SharedStorage, StorageError> {
    let storage: SharedStorage = match cfg.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::File => Arc::new(JsonFileStore::open(&cfg.path)?),
    };
    info!(backend = ?cfg.backend, path = %cfg.path, "storage opened");
    Ok(storage)
}
