//! Error types for obfuscation and salt storage.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for redaction operations.
pub type Result<T> = std::result::Result<T, RedactError>;

/// Errors that can occur on the obfuscation path.
///
/// None of these ever carry salt bytes or sensitive plaintext.
#[derive(Error, Debug)]
pub enum RedactError {
    /// The encrypted salt record does not exist.
    #[error("salt store not found: {}", path.display())]
    StoreMissing { path: PathBuf },

    /// The salt record exists but cannot be decoded or decrypted.
    #[error("salt store corrupt: {0}")]
    StoreCorrupt(String),

    /// Failed to load or generate the salt key or salt bytes.
    #[error("key error: {0}")]
    KeyError(String),

    /// I/O error during key or store file operations.
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error while writing the store envelope.
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<RedactError> for pd_common::Error {
    fn from(err: RedactError) -> Self {
        match err {
            RedactError::StoreMissing { path } => pd_common::Error::SaltStoreMissing { path },
            RedactError::StoreCorrupt(msg) => pd_common::Error::SaltStoreCorrupt(msg),
            RedactError::KeyError(msg) => pd_common::Error::SaltKey(msg),
            RedactError::IoError(e) => pd_common::Error::Io(e),
            RedactError::JsonError(e) => pd_common::Error::Json(e),
        }
    }
}
