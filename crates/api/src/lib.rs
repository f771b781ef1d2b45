//! # TaskFlow App
//!
//! Application layer - composition root and entry point.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Logging bootstrap and command helpers
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires the session components to their infrastructure adapters

pub mod context;
pub mod utils;

pub use context::*;
