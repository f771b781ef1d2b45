//! # TaskFlow Core
//!
//! Session credential management - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for transport, gateway and storage
//! - The renewal coordinator, expiry scheduler, request decorator and
//!   session lifecycle controller
//!
//! ## Architecture Principles
//! - Only depends on `taskflow-common` and `taskflow-domain`
//! - No HTTP, keychain or platform code
//! - All external dependencies via traits

pub mod session;

// Re-export specific items to avoid ambiguity
pub use session::ports::{
    AuthGateway, CredentialStore, HttpTransport, RefreshCredentialStore, RenewalListener,
    RenewalTrigger,
};
pub use session::{
    AuthenticatedTransport, ExpiryScheduler, MemoryCredentialStore, MemoryRefreshStore,
    RenewalCoordinator, SchedulePolicy, SessionController,
};
