//! Encrypted persistence for the salt record.
//!
//! Two files:
//! - a key file holding 32 base64-encoded bytes
//! - a store file holding the salt record encrypted with ChaCha20-Poly1305
//!
//! Both are written with 0600 permissions on Unix. The salt never touches
//! disk in plaintext.

use crate::error::{RedactError, Result};
use crate::salt::SaltRecord;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Schema version for the store file.
pub const STORE_SCHEMA_VERSION: &str = "1.0.0";

/// Encryption algorithm identifier written into the store file.
pub const STORE_ALGORITHM: &str = "chacha20poly1305";

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Key that encrypts the salt record.
#[derive(Clone)]
pub struct SaltKey {
    key: [u8; KEY_LEN],
}

impl SaltKey {
    /// Create a new random key.
    pub fn generate() -> Result<Self> {
        let mut key = [0u8; KEY_LEN];
        getrandom::getrandom(&mut key)
            .map_err(|e| RedactError::KeyError(format!("failed to generate random key: {}", e)))?;
        Ok(Self { key })
    }

    pub fn from_bytes(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Create key material from base64-encoded string.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| RedactError::KeyError(format!("invalid base64: {}", e)))?;

        if decoded.len() != KEY_LEN {
            return Err(RedactError::KeyError(format!(
                "key must be {} bytes, got {}",
                KEY_LEN,
                decoded.len()
            )));
        }

        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&decoded);
        Ok(Self { key })
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.key)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = read_if_present(path)?.ok_or_else(|| {
            RedactError::KeyError(format!("key file not found: {}", path.display()))
        })?;
        Self::from_base64(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_private(path, self.to_base64().as_bytes())
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.key))
    }

    /// Encrypt a salt record into a store envelope.
    pub fn seal(&self, record: &SaltRecord) -> Result<SaltEnvelope> {
        let mut nonce = [0u8; NONCE_LEN];
        getrandom::getrandom(&mut nonce)
            .map_err(|e| RedactError::KeyError(format!("failed to generate nonce: {}", e)))?;

        let ciphertext = self
            .cipher()
            .encrypt(Nonce::from_slice(&nonce), record.to_plain_bytes().as_slice())
            .map_err(|_| RedactError::KeyError("salt encryption failed".to_string()))?;

        let b64 = base64::engine::general_purpose::STANDARD;
        Ok(SaltEnvelope {
            schema_version: STORE_SCHEMA_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            algorithm: STORE_ALGORITHM.to_string(),
            nonce: b64.encode(nonce),
            ciphertext: b64.encode(ciphertext),
        })
    }

    /// Decrypt a store envelope.
    pub fn open(&self, envelope: &SaltEnvelope) -> Result<SaltRecord> {
        if envelope.algorithm != STORE_ALGORITHM {
            return Err(RedactError::StoreCorrupt(format!(
                "unsupported algorithm '{}'",
                envelope.algorithm
            )));
        }
        let b64 = base64::engine::general_purpose::STANDARD;
        let nonce = b64
            .decode(&envelope.nonce)
            .map_err(|e| RedactError::StoreCorrupt(format!("invalid nonce encoding: {}", e)))?;
        if nonce.len() != NONCE_LEN {
            return Err(RedactError::StoreCorrupt(format!(
                "nonce must be {} bytes, got {}",
                NONCE_LEN,
                nonce.len()
            )));
        }
        let ciphertext = b64.decode(&envelope.ciphertext).map_err(|e| {
            RedactError::StoreCorrupt(format!("invalid ciphertext encoding: {}", e))
        })?;

        let plain = self
            .cipher()
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_slice())
            .map_err(|_| {
                RedactError::StoreCorrupt("authentication failed (wrong key or tampered file)".into())
            })?;
        SaltRecord::from_plain_bytes(&plain)
    }
}

/// On-disk form of the encrypted salt record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaltEnvelope {
    pub schema_version: String,
    pub created_at: String,
    pub algorithm: String,
    /// Base64 nonce.
    pub nonce: String,
    /// Base64 ciphertext (salt ‖ position seed, with auth tag).
    pub ciphertext: String,
}

/// Paths of a salt store.
#[derive(Debug, Clone)]
pub struct SaltStore {
    record_path: PathBuf,
    key_path: PathBuf,
}

impl SaltStore {
    pub fn new(record_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            record_path: record_path.into(),
            key_path: key_path.into(),
        }
    }

    pub fn record_path(&self) -> &Path {
        &self.record_path
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    pub fn exists(&self) -> bool {
        self.record_path.exists()
    }

    /// Load and decrypt the salt record.
    pub fn load(&self) -> Result<SaltRecord> {
        let content =
            read_if_present(&self.record_path)?.ok_or_else(|| RedactError::StoreMissing {
                path: self.record_path.clone(),
            })?;
        let key = SaltKey::load(&self.key_path)?;
        let envelope: SaltEnvelope = serde_json::from_str(&content)
            .map_err(|e| RedactError::StoreCorrupt(format!("invalid store file: {}", e)))?;
        let record = key.open(&envelope)?;
        tracing::debug!(
            path = %self.record_path.display(),
            salt_id = %record.fingerprint(),
            "salt store loaded"
        );
        Ok(record)
    }

    /// Encrypt and write a salt record with an existing key.
    pub fn save(&self, record: &SaltRecord, key: &SaltKey) -> Result<()> {
        let envelope = key.seal(record)?;
        let content = serde_json::to_string_pretty(&envelope)?;
        write_private(&self.record_path, content.as_bytes())
    }

    /// Generate a fresh key and salt record and persist both.
    ///
    /// Reuses an existing key file if present.
    pub fn create(&self) -> Result<SaltRecord> {
        let key = match read_if_present(&self.key_path)? {
            Some(content) => SaltKey::from_base64(&content)?,
            None => {
                let key = SaltKey::generate()?;
                key.save(&self.key_path)?;
                key
            }
        };
        let record = SaltRecord::generate()?;
        self.save(&record, &key)?;
        tracing::info!(
            path = %self.record_path.display(),
            salt_id = %record.fingerprint(),
            "salt store created"
        );
        Ok(record)
    }

    /// Load the record, creating the store on first use.
    ///
    /// A store that exists but fails to decrypt is an error, never silently
    /// replaced: replacing it would change every digest.
    pub fn load_or_create(&self) -> Result<SaltRecord> {
        match self.load() {
            Err(RedactError::StoreMissing { .. }) => self.create(),
            other => other,
        }
    }
}

/// File contents, or `None` if the file does not exist.
fn read_if_present(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write a file readable only by the owner.
///
/// On Unix, creates file with 0600 permissions atomically to prevent
/// race conditions where the file might be readable before permissions are set.
fn write_private(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        file.write_all(content)?;
        file.sync_all()?;
    }

    #[cfg(not(unix))]
    {
        std::fs::write(path, content)?;
    }

    Ok(())
}
