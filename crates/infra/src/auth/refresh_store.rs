//! Durable refresh credential stores

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use taskflow_common::security::{KeychainError, SecretStore};
use taskflow_core::RefreshCredentialStore;
use taskflow_domain::{RefreshCredential, Result};
use tracing::debug;
use url::Url;

use crate::auth::gateway::REFRESH_PATH;
use crate::errors::InfraError;

/// Name of the HttpOnly cookie the server sets on login and renewal.
pub const REFRESH_COOKIE: &str = "refreshToken";

const KEYCHAIN_KEY: &str = "refresh_token";

/// Refresh credential held as an HttpOnly cookie in the transport's jar.
///
/// The server sets and rotates the cookie; this store only inspects and
/// expires it.
pub struct CookieRefreshStore {
    jar: Arc<Jar>,
    renewal_url: Url,
}

impl CookieRefreshStore {
    /// # Errors
    /// `TaskflowError::Config` if `base_url` cannot be joined with the
    /// renewal route.
    pub fn new(jar: Arc<Jar>, base_url: &Url) -> Result<Self> {
        let renewal_url = base_url.join(REFRESH_PATH).map_err(InfraError::from)?;
        Ok(Self { jar, renewal_url })
    }
}

impl RefreshCredentialStore for CookieRefreshStore {
    fn load(&self) -> Result<Option<RefreshCredential>> {
        let present = self.jar.cookies(&self.renewal_url).is_some_and(|header| {
            header.to_str().is_ok_and(|cookies| {
                cookies.split(';').filter_map(|pair| pair.trim().split_once('=')).any(
                    |(name, value)| name == REFRESH_COOKIE && !value.is_empty(),
                )
            })
        });
        Ok(present.then_some(RefreshCredential::Cookie))
    }

    fn save(&self, _token: &str) -> Result<()> {
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let expired = format!("{REFRESH_COOKIE}=; Max-Age=0; Path=/");
        self.jar.add_cookie_str(&expired, &self.renewal_url);
        debug!("refresh cookie expired locally");
        Ok(())
    }
}

/// Refresh token persisted in the platform keychain.
pub struct KeychainRefreshStore {
    secrets: Arc<dyn SecretStore>,
}

impl KeychainRefreshStore {
    pub fn new(secrets: Arc<dyn SecretStore>) -> Self {
        Self { secrets }
    }
}

impl RefreshCredentialStore for KeychainRefreshStore {
    fn load(&self) -> Result<Option<RefreshCredential>> {
        match self.secrets.get_secret(KEYCHAIN_KEY) {
            Ok(token) if !token.is_empty() => Ok(Some(RefreshCredential::Token(token))),
            Ok(_) | Err(KeychainError::NotFound) => Ok(None),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        self.secrets.set_secret(KEYCHAIN_KEY, token).map_err(|e| InfraError::from(e).into())
    }

    fn clear(&self) -> Result<()> {
        self.secrets.delete_secret(KEYCHAIN_KEY).map_err(|e| InfraError::from(e).into())
    }
}
