//! # TaskFlow Infrastructure
//!
//! Infrastructure implementations of the session ports.
//!
//! This crate contains:
//! - The reqwest-backed HTTP transport
//! - The authentication gateway for the TaskFlow member API
//! - Cookie-jar and keychain credential stores
//! - The typed application API client
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `taskflow-core`
//! - Contains all "impure" code (network, keychain, filesystem)

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use api::TaskflowApiClient;
pub use auth::{
    CookieRefreshStore, HttpAuthGateway, KeychainCredentialStore, KeychainRefreshStore,
    REFRESH_COOKIE,
};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
