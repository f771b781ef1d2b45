//! Authentication adapters
//!
//! - [`gateway`]: login, renewal, logout and registration over HTTP
//! - [`refresh_store`]: durable refresh credential in a cookie jar or the
//!   keychain
//! - [`credential_store`]: keychain-backed access credential

pub mod credential_store;
pub mod gateway;
pub mod refresh_store;

pub use credential_store::KeychainCredentialStore;
pub use gateway::HttpAuthGateway;
pub use refresh_store::{CookieRefreshStore, KeychainRefreshStore, REFRESH_COOKIE};
