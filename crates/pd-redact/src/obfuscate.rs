//! Salted-hash obfuscation of sensitive values.
//!
//! For a value `v` at attribute path `p`:
//!
//! 1. `bytes = canonical_bytes(v)`
//! 2. `P = u64(HMAC-SHA256(position_seed, p)[..8]) mod (len(bytes) + 1)`
//! 3. `digest = SHA-256(bytes[..P] ‖ salt ‖ bytes[P..])`
//!
//! Equal `(value, path, salt record)` always give the same digest, so a
//! changed secret shows up as a changed digest without the plaintext ever
//! being displayed. The digest reveals neither the salt nor the value.

use crate::salt::SaltRecord;
use crate::sensitive::replace_path;
use hmac::{Hmac, Mac};
use pd_common::{path_is_within, ConfigValue};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Marker opening a rendered digest.
pub const OBFUSCATED_PREFIX: &str = "«obfuscated:";
/// Marker closing a rendered digest.
pub const OBFUSCATED_SUFFIX: &str = "»";

/// An irreversible digest standing in for a sensitive value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObfuscatedValue {
    digest: String,
}

impl ObfuscatedValue {
    /// Hex SHA-256 digest (64 chars).
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Display form, recognizable by [`is_obfuscated_placeholder`].
    pub fn placeholder(&self) -> String {
        format!("{}{}{}", OBFUSCATED_PREFIX, self.digest, OBFUSCATED_SUFFIX)
    }

    pub fn to_config_value(&self) -> ConfigValue {
        ConfigValue::String(self.placeholder())
    }
}

/// Whether `text` (a value or a rendered line) carries an obfuscated digest.
pub fn is_obfuscated_placeholder(text: &str) -> bool {
    text.contains(OBFUSCATED_PREFIX)
}

/// Obfuscate one value with an explicit salt record.
pub fn obfuscate(value: &ConfigValue, path: &str, salt: &SaltRecord) -> ObfuscatedValue {
    Obfuscator::new(salt.clone()).obfuscate(value, path)
}

/// Applies salted hashing with one fixed salt record.
#[derive(Debug, Clone)]
pub struct Obfuscator {
    salt: SaltRecord,
}

impl Obfuscator {
    pub fn new(salt: SaltRecord) -> Self {
        Self { salt }
    }

    /// Identifier of the salt in use, safe for reports and logs.
    pub fn salt_id(&self) -> String {
        self.salt.fingerprint()
    }

    pub fn obfuscate(&self, value: &ConfigValue, path: &str) -> ObfuscatedValue {
        let bytes = value.canonical_bytes();
        let offset = self.insertion_offset(path, bytes.len());

        let mut hasher = Sha256::new();
        hasher.update(&bytes[..offset]);
        hasher.update(self.salt.salt());
        hasher.update(&bytes[offset..]);

        ObfuscatedValue {
            digest: hex::encode(hasher.finalize()),
        }
    }

    /// Offset in `0..=len` at which the salt is inserted for `path`.
    pub fn insertion_offset(&self, path: &str, len: usize) -> usize {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.salt.position_seed())
            .expect("HMAC can take key of any size");
        mac.update(path.as_bytes());
        let out = mac.finalize().into_bytes();

        let mut head = [0u8; 8];
        head.copy_from_slice(&out[..8]);
        let candidates = len as u64 + 1;
        (u64::from_be_bytes(head) % candidates) as usize
    }

    /// Copy of the subtree at `base_path` with every sensitive node inside it
    /// replaced by its digest placeholder.
    ///
    /// Each node is hashed with its own full path, so identical secrets under
    /// different keys still give different digests.
    pub fn obfuscate_tree<'a>(
        &self,
        value: &ConfigValue,
        base_path: &str,
        sensitive_paths: impl IntoIterator<Item = &'a str>,
    ) -> ConfigValue {
        let mut out = value.clone();
        for path in sensitive_paths {
            if !path_is_within(path, base_path) {
                continue;
            }
            if path == base_path {
                return self.obfuscate(value, path).to_config_value();
            }
            let relative = &path[base_path.len() + 1..];
            let Some(node) = value.get_path(relative) else {
                continue;
            };
            if node.is_null() {
                continue;
            }
            let placeholder = self.obfuscate(node, path).to_config_value();
            if let Some(next) = replace_path(&out, relative, placeholder) {
                out = next;
            }
        }
        out
    }
}
