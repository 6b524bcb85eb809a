//! Process-wide store context.
//!
//! The binary opens its backend once at startup and installs it here; code
//! that has no store handed to it can then ask for `shared()`. Asking before
//! `install` is an error, never a panic. The slot lives for the rest of the
//! process and cannot be replaced.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;

use super::SafetyStorage;
use crate::errors::StorageError;

static SHARED: OnceCell<Arc<dyn SafetyStorage>> = OnceCell::new();

/// Install the process-wide store. Fails if one is already installed.
pub fn install(storage: Arc<dyn SafetyStorage>) -> Result<(), StorageError> {
    SHARED.set(storage).map_err(|_| StorageError::AlreadyConfigured)?;
    info!(event = "shared_storage_installed", "process-wide storage installed");
    Ok(())
}

/// The installed store, or `StorageError::NotConfigured`.
pub fn shared() -> Result<Arc<dyn SafetyStorage>, StorageError> {
    SHARED.get().cloned().ok_or(StorageError::NotConfigured)
}

pub fn is_installed() -> bool {
    SHARED.get().is_some()
}
