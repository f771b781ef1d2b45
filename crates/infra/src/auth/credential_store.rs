//! Keychain-backed access credential store
//!
//! Keeps an in-memory copy so reads never touch the keychain. The copy is
//! seeded from the keychain at construction.

use std::sync::Arc;

use parking_lot::RwLock;
use taskflow_common::security::SecretStore;
use taskflow_core::CredentialStore;
use taskflow_domain::Credential;
use tracing::warn;

const KEYCHAIN_KEY: &str = "access_token";

pub struct KeychainCredentialStore {
    secrets: Arc<dyn SecretStore>,
    current: RwLock<Option<Credential>>,
}

impl KeychainCredentialStore {
    /// Open the store, restoring a credential that is not yet expired.
    pub fn open(secrets: Arc<dyn SecretStore>, now_millis: i64) -> Self {
        let restored = secrets
            .get_secret(KEYCHAIN_KEY)
            .ok()
            .map(Credential::from_token)
            .filter(|credential| !credential.is_expired_at(now_millis));
        Self { secrets, current: RwLock::new(restored) }
    }
}

impl CredentialStore for KeychainCredentialStore {
    fn get(&self) -> Option<Credential> {
        self.current.read().clone()
    }

    fn set(&self, credential: Credential) {
        if let Err(err) = self.secrets.set_secret(KEYCHAIN_KEY, credential.token()) {
            warn!(error = %err, "failed to persist access credential; keeping it in memory");
        }
        *self.current.write() = Some(credential);
    }

    fn clear(&self) {
        *self.current.write() = None;
        if let Err(err) = self.secrets.delete_secret(KEYCHAIN_KEY) {
            warn!(error = %err, "failed to remove access credential from keychain");
        }
    }
}

#[cfg(test)]
mod tests {
    use taskflow_common::testing::MockKeychainProvider;

    use super::*;

    #[test]
    fn set_persists_and_clear_removes() {
        let keychain = MockKeychainProvider::new();
        let store = KeychainCredentialStore::open(Arc::new(keychain.clone()), 0);
        assert!(store.get().is_none());

        store.set(Credential::from_token("t1"));
        assert_eq!(store.get().unwrap().token(), "t1");
        assert!(keychain.secret_exists("access_token"));

        store.clear();
        assert!(store.get().is_none());
        assert!(keychain.is_empty());
    }

    #[test]
    fn open_restores_persisted_credential() {
        let keychain = MockKeychainProvider::new();
        keychain.set_secret("access_token", "opaque").unwrap();

        let store = KeychainCredentialStore::open(Arc::new(keychain), 0);

        assert_eq!(store.get().unwrap().token(), "opaque");
    }

    #[test]
    fn write_failure_still_updates_memory() {
        let keychain = MockKeychainProvider::new();
        keychain.fail_writes(true);
        let store = KeychainCredentialStore::open(Arc::new(keychain), 0);

        store.set(Credential::from_token("t1"));

        assert_eq!(store.get().unwrap().token(), "t1");
    }
}
