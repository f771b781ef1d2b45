//! Proactive renewal ahead of credential expiry

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use taskflow_common::time::{one_shot, Clock, TimerHandle};
use taskflow_domain::config::{DEFAULT_LEAD_MARGIN_MS, DEFAULT_MINIMUM_DELAY_MS};
use taskflow_domain::{Credential, SessionConfig};
use tracing::{debug, warn};

use super::ports::RenewalTrigger;

/// Timing rules for scheduled renewals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePolicy {
    /// How long before expiry the renewal should fire.
    pub lead_margin: Duration,
    /// Floor applied to every computed delay.
    pub minimum_delay: Duration,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            lead_margin: Duration::from_millis(DEFAULT_LEAD_MARGIN_MS),
            minimum_delay: Duration::from_millis(DEFAULT_MINIMUM_DELAY_MS),
        }
    }
}

impl From<&SessionConfig> for SchedulePolicy {
    fn from(config: &SessionConfig) -> Self {
        Self {
            lead_margin: Duration::from_millis(config.lead_margin_ms),
            minimum_delay: Duration::from_millis(config.minimum_delay_ms),
        }
    }
}

impl SchedulePolicy {
    /// `max(expires_at - now - lead_margin, minimum_delay)`.
    ///
    /// Already-expired and nearly-expired credentials get the floor.
    pub fn delay_for(&self, expires_at_millis: i64, now_millis: i64) -> Duration {
        let lead = i64::try_from(self.lead_margin.as_millis()).unwrap_or(i64::MAX);
        let remaining = expires_at_millis.saturating_sub(now_millis).saturating_sub(lead);
        let remaining = Duration::from_millis(u64::try_from(remaining).unwrap_or(0));
        remaining.max(self.minimum_delay)
    }
}

/// Keeps at most one renewal timer armed.
pub struct ExpiryScheduler {
    clock: Arc<dyn Clock>,
    policy: SchedulePolicy,
    trigger: RwLock<Option<Weak<dyn RenewalTrigger>>>,
    current: Mutex<Option<TimerHandle>>,
}

impl ExpiryScheduler {
    pub fn new(clock: Arc<dyn Clock>, policy: SchedulePolicy) -> Self {
        Self { clock, policy, trigger: RwLock::new(None), current: Mutex::new(None) }
    }

    /// Register what fires when a timer elapses.
    pub fn set_trigger(&self, trigger: Weak<dyn RenewalTrigger>) {
        *self.trigger.write() = Some(trigger);
    }

    pub const fn policy(&self) -> SchedulePolicy {
        self.policy
    }

    /// Arm a renewal timer for `credential`, replacing any pending one.
    ///
    /// When the expiry cannot be decoded nothing is armed and `None` is
    /// returned. Must be called from within a tokio runtime.
    pub fn arm(&self, credential: &Credential) -> Option<TimerHandle> {
        let mut current = self.current.lock();
        if let Some(previous) = current.take() {
            previous.cancel();
        }

        let expires_at = match credential.expires_at_millis() {
            Ok(expires_at) => expires_at,
            Err(err) => {
                warn!(error = %err, "cannot schedule renewal: credential expiry unreadable");
                return None;
            }
        };

        let delay = self.policy.delay_for(expires_at, self.clock.epoch_millis());
        let trigger = self.trigger.read().clone();
        let handle = one_shot(delay, async move {
            match trigger.as_ref().and_then(Weak::upgrade) {
                Some(trigger) => trigger.trigger_renewal().await,
                None => debug!("scheduled renewal fired with no live trigger"),
            }
        });

        debug!(delay_ms = delay.as_millis(), "renewal timer armed");
        *current = Some(handle.clone());
        Some(handle)
    }

    /// Cancel the pending timer, if any.
    pub fn disarm(&self) {
        if let Some(handle) = self.current.lock().take() {
            handle.cancel();
            debug!("renewal timer disarmed");
        }
    }

    /// Whether a timer is armed and has not yet fired.
    pub fn is_armed(&self) -> bool {
        self.current.lock().as_ref().is_some_and(TimerHandle::is_pending)
    }
}

impl std::fmt::Debug for ExpiryScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryScheduler")
            .field("policy", &self.policy)
            .field("armed", &self.is_armed())
            .finish_non_exhaustive()
    }
}
