//! Configuration structures
//!
//! Every field carries a default so partial JSON/TOML files and an empty
//! environment both produce a usable configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Default API origin for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Renew this long before the access credential expires.
pub const DEFAULT_LEAD_MARGIN_MS: u64 = 60_000;

/// Never schedule a renewal sooner than this.
pub const DEFAULT_MINIMUM_DELAY_MS: u64 = 10_000;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Outbound HTTP settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Total attempts for idempotent requests (initial try + retries).
    pub max_attempts: usize,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 10_000,
            max_attempts: 3,
            user_agent: concat!("taskflow-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Session credential settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub lead_margin_ms: u64,
    pub minimum_delay_ms: u64,
    pub refresh_policy: RefreshPolicy,
    pub credential_storage: CredentialStorage,
    pub logout_path: String,
    pub keychain_service: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lead_margin_ms: DEFAULT_LEAD_MARGIN_MS,
            minimum_delay_ms: DEFAULT_MINIMUM_DELAY_MS,
            refresh_policy: RefreshPolicy::default(),
            credential_storage: CredentialStorage::default(),
            logout_path: "/api/member/logout".to_string(),
            keychain_service: "TaskFlow.session".to_string(),
        }
    }
}

/// Where the durable refresh credential lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPolicy {
    /// HttpOnly cookie managed by the server and the transport's cookie jar.
    #[default]
    Cookie,
    /// Refresh token held in the platform keychain and sent in the body.
    Keychain,
}

impl_domain_status_conversions!(RefreshPolicy {
    Cookie => "cookie",
    Keychain => "keychain",
});

/// Where the access credential lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStorage {
    /// Process memory only; recovered at startup via bootstrap.
    #[default]
    Memory,
    Keychain,
}

impl_domain_status_conversions!(CredentialStorage {
    Memory => "memory",
    Keychain => "keychain",
});
