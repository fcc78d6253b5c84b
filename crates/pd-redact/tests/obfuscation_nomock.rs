//! Obfuscation and salt store tests against real files and real crypto.

use pd_common::ConfigValue;
use pd_redact::{
    is_obfuscated_placeholder, obfuscate, Obfuscator, RedactError, SaltKey, SaltRecord, SaltStore,
};
use proptest::prelude::*;
use std::collections::HashSet;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> SaltStore {
    SaltStore::new(dir.path().join("salt.json"), dir.path().join("salt.key"))
}

#[test]
fn test_store_roundtrip_keeps_digests_stable() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    assert!(!store.exists());

    let created = store.load_or_create().unwrap();
    assert!(store.exists());
    let loaded = store.load_or_create().unwrap();
    assert_eq!(created, loaded);

    let value = ConfigValue::from("db-password-123");
    let a = Obfuscator::new(created).obfuscate(&value, "password");
    let b = Obfuscator::new(loaded).obfuscate(&value, "password");
    assert_eq!(a, b);
}

#[test]
fn test_store_file_never_holds_plaintext_salt() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let record = SaltRecord::from_bytes([0x42; 32], [0x24; 32]);
    let key = SaltKey::generate().unwrap();
    store.save(&record, &key).unwrap();

    let content = std::fs::read_to_string(store.record_path()).unwrap();
    assert!(!content.contains(&hex::encode([0x42u8; 32])));
    assert!(content.contains("chacha20poly1305"));
}

#[cfg(unix)]
#[test]
fn test_store_files_are_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.create().unwrap();

    for path in [store.record_path(), store.key_path()] {
        let mode = std::fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "{} has mode {:o}", path.display(), mode);
    }
}

#[test]
fn test_missing_store_is_distinct_error() {
    let dir = TempDir::new().unwrap();
    let err = store_in(&dir).load().unwrap_err();
    assert!(matches!(err, RedactError::StoreMissing { .. }));

    let unified: pd_common::Error = err.into();
    assert_eq!(unified.code(), 30);
}

#[test]
fn test_corrupt_store_is_not_replaced() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.create().unwrap();
    std::fs::write(store.record_path(), "{ not json").unwrap();

    let err = store.load_or_create().unwrap_err();
    assert!(matches!(err, RedactError::StoreCorrupt(_)));
    assert_eq!(
        std::fs::read_to_string(store.record_path()).unwrap(),
        "{ not json"
    );

    let unified: pd_common::Error = err.into();
    assert_eq!(unified.code(), 31);
}

#[test]
fn test_missing_key_file_is_key_error() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.create().unwrap();
    std::fs::remove_file(store.key_path()).unwrap();

    assert!(matches!(store.load(), Err(RedactError::KeyError(_))));
    assert!(matches!(
        SaltKey::load(store.key_path()),
        Err(RedactError::KeyError(_))
    ));
}

#[test]
fn test_create_reuses_existing_key_file() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let key = SaltKey::generate().unwrap();
    key.save(store.key_path()).unwrap();

    let created = store.create().unwrap();
    let reloaded_key = SaltKey::load(store.key_path()).unwrap();
    assert_eq!(reloaded_key.to_base64(), key.to_base64());
    assert_eq!(store.load().unwrap().fingerprint(), created.fingerprint());
}

#[test]
fn test_store_with_wrong_key_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.create().unwrap();
    SaltKey::generate().unwrap().save(store.key_path()).unwrap();

    assert!(matches!(store.load(), Err(RedactError::StoreCorrupt(_))));
}

#[test]
fn test_ten_thousand_distinct_strings_give_distinct_digests() {
    let salt = SaltRecord::generate().unwrap();
    let ob = Obfuscator::new(salt);
    let mut seen = HashSet::new();
    for i in 0..10_000u32 {
        let value = ConfigValue::from(format!("secret-{:08x}-{}", i.wrapping_mul(2_654_435_761), i));
        let digest = ob.obfuscate(&value, "password");
        assert!(seen.insert(digest.digest().to_string()), "collision at {}", i);
    }
    assert_eq!(seen.len(), 10_000);
}

#[test]
fn test_free_function_matches_obfuscator() {
    let salt = SaltRecord::from_bytes([5; 32], [6; 32]);
    let value = ConfigValue::from("abc");
    let digest = obfuscate(&value, "token", &salt);
    assert_eq!(digest, Obfuscator::new(salt).obfuscate(&value, "token"));
    assert!(is_obfuscated_placeholder(&digest.placeholder()));
}

proptest! {
    #[test]
    fn prop_obfuscation_is_stable(value in ".*", path in "[a-z_]{1,12}(\\.[a-z0-9_]{1,8}){0,3}") {
        let ob = Obfuscator::new(SaltRecord::from_bytes([11; 32], [12; 32]));
        let v = ConfigValue::from(value.as_str());
        prop_assert_eq!(ob.obfuscate(&v, &path), ob.obfuscate(&v, &path));
    }

    #[test]
    fn prop_digest_never_contains_plaintext(value in "[a-zA-Z0-9]{8,40}") {
        let ob = Obfuscator::new(SaltRecord::from_bytes([11; 32], [12; 32]));
        let placeholder = ob.obfuscate(&ConfigValue::from(value.as_str()), "p").placeholder();
        prop_assert!(!placeholder.contains(&value));
    }
}
