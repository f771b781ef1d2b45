//! Single-flight credential renewal
//!
//! At most one renewal network call is outstanding at any time. Callers
//! that ask for a renewal while one is in flight are queued and settled,
//! in arrival order, with the outcome of that one call.
//!
//! The call itself runs on a spawned task so that it completes even if the
//! caller that started it is dropped. A guard on that task resets the state
//! to idle on every exit path, including panics and runtime shutdown.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};

use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use taskflow_common::time::Clock;
use taskflow_domain::{Credential, RenewalPhase, Result, TaskflowError, UserIdentity};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use super::ports::{AuthGateway, CredentialStore, RefreshCredentialStore, RenewalListener};

type Waiter = oneshot::Sender<Result<Credential>>;

enum RenewalState {
    Idle,
    InFlight { waiters: VecDeque<Waiter> },
}

/// Owner of the renewal protocol for one application session.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct RenewalCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    gateway: Arc<dyn AuthGateway>,
    credentials: Arc<dyn CredentialStore>,
    refresh_store: Arc<dyn RefreshCredentialStore>,
    clock: Arc<dyn Clock>,
    state: Mutex<RenewalState>,
    phase: watch::Sender<RenewalPhase>,
    listener: RwLock<Option<Weak<dyn RenewalListener>>>,
}

impl RenewalCoordinator {
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        credentials: Arc<dyn CredentialStore>,
        refresh_store: Arc<dyn RefreshCredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (phase, _) = watch::channel(RenewalPhase::Idle);
        Self {
            inner: Arc::new(CoordinatorInner {
                gateway,
                credentials,
                refresh_store,
                clock,
                state: Mutex::new(RenewalState::Idle),
                phase,
                listener: RwLock::new(None),
            }),
        }
    }

    /// Register the component that reacts to renewal outcomes.
    ///
    /// Held weakly so the listener may own this coordinator.
    pub fn set_listener(&self, listener: Weak<dyn RenewalListener>) {
        *self.inner.listener.write() = Some(listener);
    }

    /// Obtain a fresh access credential.
    ///
    /// Starts a renewal if none is in flight, otherwise joins the queue of
    /// the current one. Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Every caller settled by one renewal receives the same error.
    /// Payload validation failures surface as
    /// `TaskflowError::AuthenticationRejected`.
    pub async fn renew(&self) -> Result<Credential> {
        let (waiter, outcome) = oneshot::channel();

        if self.inner.enqueue(waiter) {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move { inner.run_flight().await });
        }

        outcome.await.unwrap_or_else(|_| {
            Err(TaskflowError::Internal("renewal abandoned before settling".into()))
        })
    }

    /// Current renewal phase.
    pub fn phase(&self) -> RenewalPhase {
        *self.inner.phase.borrow()
    }

    /// Wait until no renewal is in flight.
    ///
    /// Returns once the in-flight renewal (if any) has notified the listener
    /// and settled all waiters.
    pub async fn settled(&self) {
        let mut phase = self.inner.phase.subscribe();
        // The sender lives in `inner`, which `self` keeps alive.
        let _ = phase.wait_for(|phase| *phase == RenewalPhase::Idle).await;
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.credentials
    }

    pub fn refresh_store(&self) -> &Arc<dyn RefreshCredentialStore> {
        &self.inner.refresh_store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }
}

impl CoordinatorInner {
    /// Queue a waiter. Returns `true` if the caller must start the flight.
    fn enqueue(&self, waiter: Waiter) -> bool {
        let mut state = self.state.lock();
        match &mut *state {
            RenewalState::InFlight { waiters } => {
                waiters.push_back(waiter);
                debug!(waiters = waiters.len(), "joined in-flight renewal");
                false
            }
            RenewalState::Idle => {
                *state = RenewalState::InFlight { waiters: VecDeque::from([waiter]) };
                self.phase.send_replace(RenewalPhase::InFlight);
                true
            }
        }
    }

    async fn run_flight(self: Arc<Self>) {
        let _guard = FlightGuard { inner: &self };

        let outcome = AssertUnwindSafe(self.perform())
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(TaskflowError::Internal("renewal call panicked".into())));

        match outcome {
            Ok((credential, user)) => self.succeed(&credential, user.as_ref()),
            Err(error) => self.fail(&error),
        }
    }

    async fn perform(&self) -> Result<(Credential, Option<UserIdentity>)> {
        let refresh = self.refresh_store.load()?.ok_or_else(|| {
            TaskflowError::AuthenticationRejected("no durable refresh credential available".into())
        })?;

        debug!(credential = ?refresh, "issuing renewal call");
        let grant = self.gateway.refresh(&refresh).await.map_err(TaskflowError::into_rejection)?;

        let credential = Credential::issue(grant.access_token, self.clock.epoch_millis())
            .map_err(TaskflowError::into_rejection)?;

        if let Some(rotated) = grant.refresh_token.as_deref() {
            if let Err(err) = self.refresh_store.save(rotated) {
                warn!(error = %err, "failed to persist rotated refresh token");
            }
        }

        Ok((credential, grant.user))
    }

    fn succeed(&self, credential: &Credential, user: Option<&UserIdentity>) {
        let mut state = self.state.lock();
        self.credentials.set(credential.clone());
        if let Some(listener) = self.listener() {
            listener.renewed(credential, user);
        }

        let waiters = take_waiters(&mut state);
        info!(waiters = waiters.len(), "credential renewed");
        for waiter in waiters {
            let _ = waiter.send(Ok(credential.clone()));
        }
        self.phase.send_replace(RenewalPhase::Idle);
    }

    fn fail(&self, error: &TaskflowError) {
        let mut state = self.state.lock();
        self.credentials.clear();
        if let Some(listener) = self.listener() {
            listener.renewal_failed(error);
        }

        let waiters = take_waiters(&mut state);
        warn!(waiters = waiters.len(), error = %error, label = error.label(), "credential renewal failed");
        for waiter in waiters {
            let _ = waiter.send(Err(error.clone()));
        }
        self.phase.send_replace(RenewalPhase::Idle);
    }

    fn listener(&self) -> Option<Arc<dyn RenewalListener>> {
        self.listener.read().as_ref().and_then(Weak::upgrade)
    }
}

/// Move the state to idle and hand back whoever was waiting.
fn take_waiters(state: &mut RenewalState) -> VecDeque<Waiter> {
    match std::mem::replace(state, RenewalState::Idle) {
        RenewalState::InFlight { waiters } => waiters,
        RenewalState::Idle => VecDeque::new(),
    }
}

/// Resets the coordinator if a flight ends without settling.
struct FlightGuard<'a> {
    inner: &'a CoordinatorInner,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        if matches!(*state, RenewalState::Idle) {
            return;
        }

        let waiters = take_waiters(&mut state);
        warn!(waiters = waiters.len(), "renewal abandoned before settling");
        for waiter in waiters {
            let _ = waiter
                .send(Err(TaskflowError::Internal("renewal abandoned before settling".into())));
        }
        self.inner.phase.send_replace(RenewalPhase::Idle);
    }
}
