//! Salt material for obfuscation.

use crate::error::{RedactError, Result};
use sha2::{Digest, Sha256};

/// Length of both the salt and the position seed.
pub const SALT_LEN: usize = 32;

/// The salt and position seed used by the obfuscator.
///
/// Generated once and persisted encrypted (see [`crate::store`]); the same
/// record must be reused for digests to stay comparable across runs. Debug
/// output never prints the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SaltRecord {
    salt: [u8; SALT_LEN],
    position_seed: [u8; SALT_LEN],
}

impl SaltRecord {
    /// Fresh random salt and position seed.
    pub fn generate() -> Result<Self> {
        let mut salt = [0u8; SALT_LEN];
        let mut position_seed = [0u8; SALT_LEN];
        getrandom::getrandom(&mut salt)
            .map_err(|e| RedactError::KeyError(format!("failed to generate salt: {}", e)))?;
        getrandom::getrandom(&mut position_seed).map_err(|e| {
            RedactError::KeyError(format!("failed to generate position seed: {}", e))
        })?;
        Ok(Self {
            salt,
            position_seed,
        })
    }

    pub fn from_bytes(salt: [u8; SALT_LEN], position_seed: [u8; SALT_LEN]) -> Self {
        Self {
            salt,
            position_seed,
        }
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn position_seed(&self) -> &[u8; SALT_LEN] {
        &self.position_seed
    }

    /// Short identifier of this record, safe to show next to digests.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"plandiff-salt-fingerprint");
        hasher.update(self.salt);
        hasher.update(self.position_seed);
        hex::encode(&hasher.finalize()[..4])
    }

    /// Plaintext layout for encryption: salt followed by position seed.
    pub(crate) fn to_plain_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SALT_LEN * 2);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.position_seed);
        out
    }

    pub(crate) fn from_plain_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SALT_LEN * 2 {
            return Err(RedactError::StoreCorrupt(format!(
                "salt record must be {} bytes, got {}",
                SALT_LEN * 2,
                bytes.len()
            )));
        }
        let mut salt = [0u8; SALT_LEN];
        let mut position_seed = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[..SALT_LEN]);
        position_seed.copy_from_slice(&bytes[SALT_LEN..]);
        Ok(Self {
            salt,
            position_seed,
        })
    }
}

impl std::fmt::Debug for SaltRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SaltRecord({})", self.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_random() {
        let a = SaltRecord::generate().unwrap();
        let b = SaltRecord::generate().unwrap();
        assert_ne!(a, b);
        assert_ne!(a.salt(), a.position_seed());
    }

    #[test]
    fn test_debug_hides_bytes() {
        let record = SaltRecord::from_bytes([0xab; SALT_LEN], [0xcd; SALT_LEN]);
        let debug = format!("{:?}", record);
        assert_eq!(debug, format!("SaltRecord({})", record.fingerprint()));
        assert!(!debug.contains(&hex::encode([0xab; SALT_LEN])));
    }

    #[test]
    fn test_plain_bytes_layout() {
        let record = SaltRecord::from_bytes([1; SALT_LEN], [2; SALT_LEN]);
        let bytes = record.to_plain_bytes();
        assert_eq!(&bytes[..SALT_LEN], &[1; SALT_LEN]);
        assert_eq!(&bytes[SALT_LEN..], &[2; SALT_LEN]);
        assert_eq!(SaltRecord::from_plain_bytes(&bytes).unwrap(), record);
        assert!(SaltRecord::from_plain_bytes(&bytes[1..]).is_err());
    }

    #[test]
    fn test_fingerprint_stable() {
        let record = SaltRecord::from_bytes([7; SALT_LEN], [9; SALT_LEN]);
        assert_eq!(record.fingerprint(), record.clone().fingerprint());
        assert_eq!(record.fingerprint().len(), 8);
    }
}
