//! Time utilities and abstractions
//!
//! - **[`clock`]**: Real and mock wall/monotonic clocks
//! - **[`timer`]**: Cancellable one-shot timers
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use taskflow_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::at_epoch_millis(1_000);
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.millis_since_epoch(), 6_000);
//! ```

pub mod clock;
pub mod timer;

pub use clock::{Clock, MockClock, SystemClock};
pub use timer::{one_shot, TimerHandle};
