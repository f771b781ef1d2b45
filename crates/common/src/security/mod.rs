//! Secure storage primitives
//!
//! [`SecretStore`] is the seam; [`KeychainProvider`] backs it with the
//! platform keychain (macOS Keychain Access, Windows Credential Manager,
//! Linux Secret Service).

pub mod keychain;

pub use keychain::{KeychainError, KeychainProvider, SecretStore};
