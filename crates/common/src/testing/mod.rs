//! Testing utilities and helpers
//!
//! - **[`async_utils`]**: polling and timeout helpers that respect paused
//!   tokio time
//! - **[`mocks`]**: in-memory stand-ins for platform services
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use taskflow_common::testing::MockClock;
//! use taskflow_common::time::Clock;
//!
//! let clock = MockClock::at_epoch_millis(0);
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.millis_since_epoch(), 5_000);
//! ```

pub mod async_utils;
pub mod mocks;

pub use async_utils::{poll_until, timeout_ok};
#[cfg(feature = "platform")]
pub use mocks::MockKeychainProvider;

pub use crate::time::MockClock;
