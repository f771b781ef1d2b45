//! Cancellable one-shot timers
//!
//! A timer is a spawned tokio task racing a sleep against a
//! [`CancellationToken`]. Because it uses `tokio::time`, tests can drive it
//! with a paused runtime and `tokio::time::advance`.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// A timer handle that can be used to cancel a pending timer
#[derive(Debug, Clone)]
pub struct TimerHandle {
    token: CancellationToken,
    fired: Arc<AtomicBool>,
    delay: Duration,
}

impl TimerHandle {
    /// Cancel the timer. Has no effect once the timer has fired.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if the timer has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Check if the timer's task has started running
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Neither fired nor cancelled.
    pub fn is_pending(&self) -> bool {
        !self.is_cancelled() && !self.has_fired()
    }

    /// Delay the timer was armed with
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

/// Run `task` once after `delay` unless the returned handle is cancelled first.
///
/// Must be called from within a tokio runtime.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use taskflow_common::time::one_shot;
///
/// #[tokio::main]
/// async fn main() {
///     let handle = one_shot(Duration::from_secs(5), async {
///         tracing::info!("fired");
///     });
///     handle.cancel();
/// }
/// ```
pub fn one_shot<F>(delay: Duration, task: F) -> TimerHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    let token = CancellationToken::new();
    let fired = Arc::new(AtomicBool::new(false));
    let handle = TimerHandle { token: token.clone(), fired: Arc::clone(&fired), delay };
    // Deadline is fixed now, not when the task is first polled.
    let deadline = sleep(delay);

    tokio::spawn(async move {
        tokio::select! {
            biased;
            () = token.cancelled() => {
                trace!(delay_ms = delay.as_millis() as u64, "one-shot timer cancelled");
            }
            () = deadline => {
                if !token.is_cancelled() {
                    fired.store(true, Ordering::SeqCst);
                    task.await;
                }
            }
        }
    });

    handle
}
