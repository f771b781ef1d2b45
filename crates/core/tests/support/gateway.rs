use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use taskflow_core::AuthGateway;
use taskflow_domain::{
    AuthGrant, Credential, LoginRequest, OAuthCallback, OAuthProvider, RefreshCredential,
    RegisterRequest, Result, TaskflowError,
};

/// Gateway answering from queued outcomes.
///
/// An empty queue answers with `AuthenticationRejected`.
#[derive(Default)]
pub struct ScriptedGateway {
    logins: Mutex<VecDeque<Result<AuthGrant>>>,
    refreshes: Mutex<VecDeque<Result<AuthGrant>>>,
    refresh_delay: Mutex<Duration>,
    fail_logout: AtomicBool,
    pub login_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn push_login(&self, outcome: Result<AuthGrant>) {
        self.logins.lock().unwrap().push_back(outcome);
    }

    pub fn push_refresh(&self, outcome: Result<AuthGrant>) {
        self.refreshes.lock().unwrap().push_back(outcome);
    }

    /// Make every renewal call take `delay` before answering.
    pub fn delay_refresh(&self, delay: Duration) {
        *self.refresh_delay.lock().unwrap() = delay;
    }

    pub fn fail_logout(&self) {
        self.fail_logout.store(true, Ordering::SeqCst);
    }

    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn next(queue: &Mutex<VecDeque<Result<AuthGrant>>>) -> Result<AuthGrant> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TaskflowError::AuthenticationRejected("nothing scripted".into())))
    }
}

#[async_trait]
impl AuthGateway for ScriptedGateway {
    async fn login(&self, _request: LoginRequest) -> Result<AuthGrant> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.logins)
    }

    async fn oauth_callback(
        &self,
        _provider: OAuthProvider,
        _callback: OAuthCallback,
    ) -> Result<AuthGrant> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.logins)
    }

    async fn refresh(&self, _refresh: &RefreshCredential) -> Result<AuthGrant> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.refresh_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Self::next(&self.refreshes)
    }

    async fn logout(
        &self,
        _access: Option<&Credential>,
        _refresh: Option<&RefreshCredential>,
    ) -> Result<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(TaskflowError::NetworkUnavailable("logout endpoint unreachable".into()));
        }
        Ok(())
    }

    async fn register(&self, _request: RegisterRequest) -> Result<()> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
