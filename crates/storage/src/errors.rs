use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("decoding error for key `{key}`: {message}")]
    Decoding { key: String, message: String },
    #[error("storage error: {0}")]
    Storage(String),
    #[error("shared storage has not been installed")]
    NotConfigured,
    #[error("shared storage is already installed")]
    AlreadyConfigured,
}

impl StorageError {
    pub fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{}: {}", context, err))
    }

    pub fn poisoned() -> Self {
        Self::Storage("store lock poisoned".into())
    }
}
