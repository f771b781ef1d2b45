//! Session lifecycle controller
//!
//! Owns the `LoggedOut -> LoggingIn -> Authenticated -> LoggingOut ->
//! LoggedOut` state machine and publishes [`SessionEvent`]s for the UI layer.
//! Renewal outcomes reach the controller through [`RenewalListener`], and
//! scheduled renewals through [`RenewalTrigger`].

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use taskflow_domain::{
    AuthGrant, Credential, LoginRequest, OAuthCallback, OAuthProvider, RegisterRequest, Result,
    SessionEvent, SessionPhase, TaskflowError, UserIdentity,
};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use super::ports::{AuthGateway, RenewalListener, RenewalTrigger};
use super::renewal::RenewalCoordinator;
use super::scheduler::ExpiryScheduler;

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Default)]
struct SessionState {
    phase: SessionPhase,
    user: Option<UserIdentity>,
}

/// Entry point for login, logout and bootstrap.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    gateway: Arc<dyn AuthGateway>,
    coordinator: RenewalCoordinator,
    scheduler: Arc<ExpiryScheduler>,
    state: RwLock<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    /// Build a controller and register it with the coordinator and scheduler.
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        coordinator: RenewalCoordinator,
        scheduler: Arc<ExpiryScheduler>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let inner = Arc::new(SessionInner {
            gateway,
            coordinator,
            scheduler,
            state: RwLock::new(SessionState::default()),
            events,
        });

        let weak = Arc::downgrade(&inner);
        inner.coordinator.set_listener(weak.clone());
        inner.scheduler.set_trigger(weak);

        Self { inner }
    }

    /// Email and password login.
    ///
    /// # Errors
    /// - `TaskflowError::InvalidState` unless the session is logged out.
    /// - `TaskflowError::AuthenticationRejected` for refused credentials or
    ///   a response without an access token or member identity.
    /// - Transport errors as returned by the gateway.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<Option<UserIdentity>> {
        let gateway = Arc::clone(&self.inner.gateway);
        self.sign_in(async move {
            let grant = gateway.login(request).await?;
            if grant.user.is_none() {
                return Err(TaskflowError::Validation(
                    "login response carried no member identity".into(),
                ));
            }
            Ok(grant)
        })
        .await
    }

    /// Social login using an authorization code the UI already obtained.
    ///
    /// # Errors
    /// Same as [`SessionController::login`], except that a missing member
    /// identity is accepted.
    #[instrument(skip(self, callback))]
    pub async fn login_with_oauth(
        &self,
        provider: OAuthProvider,
        callback: OAuthCallback,
    ) -> Result<Option<UserIdentity>> {
        let gateway = Arc::clone(&self.inner.gateway);
        self.sign_in(async move { gateway.oauth_callback(provider, callback).await }).await
    }

    async fn sign_in<F>(&self, exchange: F) -> Result<Option<UserIdentity>>
    where
        F: Future<Output = Result<AuthGrant>> + Send,
    {
        self.inner.begin_login()?;

        let outcome = match exchange.await.map_err(TaskflowError::into_rejection) {
            Ok(grant) => self.inner.establish(grant),
            Err(err) => Err(err),
        };

        match &outcome {
            Ok(user) => info!(user = user.as_ref().map(|u| u.id), "session established"),
            Err(err) => self.inner.abort_login(err),
        }
        outcome
    }

    /// Create a member account. Does not change the session.
    ///
    /// # Errors
    /// `TaskflowError::InvalidState` unless logged out, otherwise whatever
    /// the gateway returns.
    pub async fn register(&self, request: RegisterRequest) -> Result<()> {
        let phase = self.phase();
        if phase != SessionPhase::LoggedOut {
            return Err(TaskflowError::InvalidState(format!("cannot register while {phase}")));
        }
        self.inner.gateway.register(request).await
    }

    /// End the session.
    ///
    /// The server-side revocation is best-effort. Local state is always
    /// cleared and the session always ends logged out.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let inner = &self.inner;
        let previous = {
            let mut state = inner.state.write();
            std::mem::replace(&mut state.phase, SessionPhase::LoggingOut)
        };
        inner.scheduler.disarm();

        let access = inner.coordinator.credentials().get();
        let refresh = inner.coordinator.refresh_store().load().unwrap_or_else(|err| {
            warn!(error = %err, "could not read refresh credential for revocation");
            None
        });

        if previous != SessionPhase::LoggedOut || access.is_some() || refresh.is_some() {
            if let Err(err) = inner.gateway.logout(access.as_ref(), refresh.as_ref()).await {
                warn!(error = %err, label = err.label(), "server-side logout failed; clearing local session anyway");
            }
        }

        inner.coordinator.settled().await;

        inner.coordinator.credentials().clear();
        if let Err(err) = inner.coordinator.refresh_store().clear() {
            warn!(error = %err, "failed to clear refresh credential");
        }
        inner.scheduler.disarm();
        {
            let mut state = inner.state.write();
            state.phase = SessionPhase::LoggedOut;
            state.user = None;
        }

        info!(previous = %previous, "logged out");
        inner.emit(SessionEvent::LoggedOut);
        inner.emit(SessionEvent::RedirectToLogin);
    }

    /// Try to restore a session from the durable refresh credential.
    ///
    /// Never surfaces an error: `false` means no session could be restored.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) -> bool {
        let phase = self.phase();
        if phase != SessionPhase::LoggedOut {
            debug!(phase = %phase, "bootstrap skipped");
            return phase == SessionPhase::Authenticated;
        }

        match self.inner.coordinator.renew().await {
            Ok(_) => self.is_authenticated(),
            Err(err) => {
                debug!(error = %err, "no session to restore");
                false
            }
        }
    }

    /// Renew the access credential now.
    ///
    /// # Errors
    /// As for [`RenewalCoordinator::renew`].
    pub async fn refresh_now(&self) -> Result<Credential> {
        self.inner.coordinator.renew().await
    }

    /// Cancel pending timers without touching server or stored state.
    pub fn shutdown(&self) {
        self.inner.scheduler.disarm();
        debug!("session controller shut down");
    }

    /// Record identity details fetched after the session was established.
    pub fn set_user(&self, user: UserIdentity) {
        let mut state = self.inner.state.write();
        if state.phase == SessionPhase::Authenticated {
            state.user = Some(user);
        }
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.inner.state.read().user.clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.state.read().phase
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase() == SessionPhase::Authenticated
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }
}

impl SessionInner {
    fn begin_login(&self) -> Result<()> {
        let mut state = self.state.write();
        if state.phase != SessionPhase::LoggedOut {
            return Err(TaskflowError::InvalidState(format!("cannot log in while {}", state.phase)));
        }
        state.phase = SessionPhase::LoggingIn;
        Ok(())
    }

    fn establish(&self, grant: AuthGrant) -> Result<Option<UserIdentity>> {
        let credential = Credential::issue(grant.access_token, self.coordinator.clock().epoch_millis())
            .map_err(TaskflowError::into_rejection)?;

        let mut state = self.state.write();
        if state.phase != SessionPhase::LoggingIn {
            return Err(TaskflowError::InvalidState(format!(
                "login superseded while {}",
                state.phase
            )));
        }

        self.coordinator.credentials().set(credential.clone());
        if let Some(refresh) = grant.refresh_token.as_deref() {
            if let Err(err) = self.coordinator.refresh_store().save(refresh) {
                warn!(error = %err, "failed to persist refresh token");
            }
        }
        self.scheduler.arm(&credential);

        state.phase = SessionPhase::Authenticated;
        state.user.clone_from(&grant.user);
        drop(state);

        self.emit(SessionEvent::Authenticated { user: grant.user.clone() });
        Ok(grant.user)
    }

    fn abort_login(&self, error: &TaskflowError) {
        warn!(error = %error, label = error.label(), "login failed");
        let mut state = self.state.write();
        if state.phase == SessionPhase::LoggingIn {
            state.phase = SessionPhase::LoggedOut;
            state.user = None;
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl RenewalListener for SessionInner {
    fn renewed(&self, credential: &Credential, user: Option<&UserIdentity>) {
        let mut state = self.state.write();
        let previous = state.phase;
        match previous {
            SessionPhase::LoggingIn | SessionPhase::LoggingOut => {
                debug!(phase = %previous, "renewal settled during transition; not applied");
                return;
            }
            SessionPhase::LoggedOut | SessionPhase::Authenticated => {}
        }

        self.scheduler.arm(credential);
        if let Some(user) = user {
            state.user = Some(user.clone());
        }
        state.phase = SessionPhase::Authenticated;
        let event = if previous == SessionPhase::Authenticated {
            SessionEvent::Renewed
        } else {
            info!("session restored from refresh credential");
            SessionEvent::Authenticated { user: state.user.clone() }
        };
        drop(state);

        self.emit(event);
    }

    fn renewal_failed(&self, error: &TaskflowError) {
        let mut state = self.state.write();
        if state.phase != SessionPhase::Authenticated {
            debug!(phase = %state.phase, "renewal failed outside an established session");
            return;
        }
        state.phase = SessionPhase::LoggedOut;
        state.user = None;
        drop(state);

        self.scheduler.disarm();
        // A network failure leaves the refresh credential usable for a later bootstrap.
        if error.is_authentication_failure() {
            if let Err(err) = self.coordinator.refresh_store().clear() {
                warn!(error = %err, "failed to clear refresh credential");
            }
        }

        warn!(error = %error, "session ended after failed renewal");
        self.emit(SessionEvent::LoggedOut);
        self.emit(SessionEvent::RedirectToLogin);
    }
}

#[async_trait]
impl RenewalTrigger for SessionInner {
    async fn trigger_renewal(&self) {
        let phase = self.state.read().phase;
        if phase != SessionPhase::Authenticated {
            debug!(phase = %phase, "scheduled renewal skipped");
            return;
        }

        debug!("scheduled renewal firing");
        if let Err(err) = self.coordinator.renew().await {
            debug!(error = %err, "scheduled renewal failed");
        }
    }
}
