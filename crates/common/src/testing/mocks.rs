//! Mock implementations of platform services
//!
//! Provides in-memory stand-ins so tests never touch the real keychain.

// Allow missing error/panic docs for test mocks - they are designed to be simple
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[cfg(feature = "platform")]
pub use keychain::MockKeychainProvider;

#[cfg(feature = "platform")]
mod keychain {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::security::{KeychainError, SecretStore};

    /// In-memory keychain.
    ///
    /// Clones share storage. [`MockKeychainProvider::fail_writes`] makes every
    /// write return `KeychainError::AccessFailed`.
    #[derive(Debug, Clone, Default)]
    pub struct MockKeychainProvider {
        storage: Arc<Mutex<HashMap<String, String>>>,
        fail_writes: Arc<AtomicBool>,
    }

    impl MockKeychainProvider {
        pub fn new() -> Self {
            Self::default()
        }

        /// Toggle write failures (set and delete).
        pub fn fail_writes(&self, enabled: bool) {
            self.fail_writes.store(enabled, Ordering::SeqCst);
        }

        /// Determine whether a secret exists.
        #[must_use]
        pub fn secret_exists(&self, key: &str) -> bool {
            self.storage.lock().contains_key(key)
        }

        /// Number of stored secrets.
        #[must_use]
        pub fn len(&self) -> usize {
            self.storage.lock().len()
        }

        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        fn check_writable(&self) -> Result<(), KeychainError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(KeychainError::AccessFailed("mock keychain is read-only".into()));
            }
            Ok(())
        }
    }

    impl SecretStore for MockKeychainProvider {
        fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError> {
            self.check_writable()?;
            self.storage.lock().insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn get_secret(&self, key: &str) -> Result<String, KeychainError> {
            self.storage.lock().get(key).cloned().ok_or(KeychainError::NotFound)
        }

        fn delete_secret(&self, key: &str) -> Result<(), KeychainError> {
            self.check_writable()?;
            self.storage.lock().remove(key);
            Ok(())
        }
    }

}
