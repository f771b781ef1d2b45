//! # TaskFlow Domain
//!
//! Domain types and models for the TaskFlow session subsystem.
//!
//! This crate contains:
//! - Credential, identity and session state types
//! - Transport-neutral request/response envelopes
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other TaskFlow crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
