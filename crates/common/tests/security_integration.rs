//! Integration tests for secret storage abstractions

use std::sync::Arc;

use taskflow_common::security::{KeychainError, SecretStore};
use taskflow_common::testing::MockKeychainProvider;

/// Validates that the mock keychain is usable through the `SecretStore`
/// trait object, the way infrastructure adapters consume it.
#[test]
fn test_secret_store_trait_object() {
    let backing = MockKeychainProvider::new();
    let store: Arc<dyn SecretStore> = Arc::new(backing.clone());

    store.set_secret("refresh_token", "r-1").unwrap();
    store.set_secret("refresh_token", "r-2").unwrap();

    assert_eq!(store.get_secret("refresh_token").unwrap(), "r-2");
    assert!(backing.secret_exists("refresh_token"));
    assert_eq!(backing.len(), 1);
}

#[test]
fn test_missing_secret_is_not_found() {
    let store = MockKeychainProvider::new();
    let err = store.get_secret("absent").unwrap_err();
    assert!(matches!(err, KeychainError::NotFound));
    assert_eq!(err.to_string(), "Entry not found");
}
