//! In-memory credential stores
//!
//! The access credential lives in process memory for the lifetime of the
//! session and is recovered at startup only through bootstrap.

use parking_lot::RwLock;
use taskflow_domain::{Credential, RefreshCredential, Result};

use super::ports::{CredentialStore, RefreshCredentialStore};

/// Volatile access credential store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    current: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<Credential> {
        self.current.read().clone()
    }

    fn set(&self, credential: Credential) {
        *self.current.write() = Some(credential);
    }

    fn clear(&self) {
        *self.current.write() = None;
    }
}

/// Volatile refresh credential store
///
/// Used by tests and by sessions that must not outlive the process.
#[derive(Debug, Default)]
pub struct MemoryRefreshStore {
    current: RwLock<Option<RefreshCredential>>,
}

impl MemoryRefreshStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an explicit refresh token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { current: RwLock::new(Some(RefreshCredential::Token(token.into()))) }
    }

    /// Store that reports a server-managed cookie.
    pub fn with_cookie() -> Self {
        Self { current: RwLock::new(Some(RefreshCredential::Cookie)) }
    }
}

impl RefreshCredentialStore for MemoryRefreshStore {
    fn load(&self) -> Result<Option<RefreshCredential>> {
        Ok(self.current.read().clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.current.write() = Some(RefreshCredential::Token(token.to_string()));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.current.write() = None;
        Ok(())
    }
}
