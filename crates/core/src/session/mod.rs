//! Session credential management
//!
//! Components, leaves first:
//! 1. [`credential_store`]: holds the access credential
//! 2. [`renewal`]: single-flight renewal with a FIFO waiter queue
//! 3. [`scheduler`]: proactive renewal before expiry
//! 4. [`decorator`]: bearer attachment and retry-once on 401
//! 5. [`controller`]: login, logout and bootstrap

pub mod controller;
pub mod credential_store;
pub mod decorator;
pub mod ports;
pub mod renewal;
pub mod scheduler;

pub use controller::SessionController;
pub use credential_store::{MemoryCredentialStore, MemoryRefreshStore};
pub use decorator::AuthenticatedTransport;
pub use renewal::RenewalCoordinator;
pub use scheduler::{ExpiryScheduler, SchedulePolicy};
