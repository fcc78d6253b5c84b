//! Sensitive-value obfuscation for plandiff.
//!
//! Sensitive plan values are never shown in plaintext. Instead each one is
//! replaced by a salted SHA-256 digest that is stable for a given salt
//! record, so "this secret differs between staging and prod" is visible
//! while the secret itself is not.
//!
//! # Key Features
//!
//! - **Salted hashing**: the salt is inserted into the value bytes at a
//!   path-dependent offset before hashing.
//! - **Encrypted salt store**: the salt record is persisted only under
//!   ChaCha20-Poly1305 and is never embedded in output.
//! - **Mask trees**: helpers turn plan sensitivity masks into dot-paths and
//!   masked views.
//!
//! # Example
//!
//! ```no_run
//! use pd_common::ConfigValue;
//! use pd_redact::{Obfuscator, SaltStore};
//!
//! let store = SaltStore::new("salt.json", "salt.key");
//! let obfuscator = Obfuscator::new(store.load_or_create().unwrap());
//! let digest = obfuscator.obfuscate(&ConfigValue::from("hunter2"), "password");
//! assert!(!digest.placeholder().contains("hunter2"));
//! ```

pub mod error;
pub mod obfuscate;
pub mod salt;
pub mod sensitive;
pub mod store;

pub use error::{RedactError, Result};
pub use obfuscate::{is_obfuscated_placeholder, obfuscate, ObfuscatedValue, Obfuscator};
pub use salt::SaltRecord;
pub use sensitive::{mask_paths, paths_from_mask, SENSITIVE_PLACEHOLDER};
pub use store::{SaltEnvelope, SaltKey, SaltStore};
