//! Application context - dependency injection container

use std::sync::Arc;

use reqwest::cookie::Jar;
use taskflow_common::security::{KeychainProvider, SecretStore};
use taskflow_common::time::{Clock, SystemClock};
use taskflow_core::{
    AuthenticatedTransport, CredentialStore, ExpiryScheduler, MemoryCredentialStore,
    RefreshCredentialStore, RenewalCoordinator, SchedulePolicy, SessionController,
};
use taskflow_domain::{Config, CredentialStorage, RefreshPolicy, Result};
use taskflow_infra::{
    CookieRefreshStore, HttpAuthGateway, HttpClient, KeychainCredentialStore,
    KeychainRefreshStore, TaskflowApiClient,
};
use tracing::{info, warn};

/// Application context - holds the wired session and API client
pub struct AppContext {
    pub config: Config,
    pub session: SessionController,
    pub coordinator: RenewalCoordinator,
    /// Bearer-attaching transport for any further API surface.
    pub transport: Arc<AuthenticatedTransport>,
    pub api: TaskflowApiClient,
    pub refresh_store: Arc<dyn RefreshCredentialStore>,
}

impl AppContext {
    /// Build the context with the platform keychain scoped to
    /// `session.keychain_service`.
    ///
    /// # Errors
    /// `TaskflowError::Config` if the API base URL is invalid, or
    /// `TaskflowError::Internal` if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let secrets = Arc::new(KeychainProvider::new(config.session.keychain_service.clone()));
        Self::with_secrets(config, secrets)
    }

    /// Build the context over an explicit secret store.
    ///
    /// # Errors
    /// Same as [`AppContext::new`].
    pub fn with_secrets(config: Config, secrets: Arc<dyn SecretStore>) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let jar = Arc::new(Jar::default());
        let http = Arc::new(HttpClient::builder_for(&config.api).cookie_jar(jar.clone()).build()?);

        let refresh_store: Arc<dyn RefreshCredentialStore> = match config.session.refresh_policy {
            RefreshPolicy::Cookie => Arc::new(CookieRefreshStore::new(jar, http.base_url())?),
            RefreshPolicy::Keychain => Arc::new(KeychainRefreshStore::new(secrets.clone())),
        };
        let credentials: Arc<dyn CredentialStore> = match config.session.credential_storage {
            CredentialStorage::Memory => Arc::new(MemoryCredentialStore::new()),
            CredentialStorage::Keychain => {
                Arc::new(KeychainCredentialStore::open(secrets, clock.epoch_millis()))
            }
        };

        let gateway =
            Arc::new(HttpAuthGateway::new(http.clone(), config.session.logout_path.clone()));
        let coordinator = RenewalCoordinator::new(
            gateway.clone(),
            credentials,
            refresh_store.clone(),
            clock.clone(),
        );
        let scheduler =
            Arc::new(ExpiryScheduler::new(clock, SchedulePolicy::from(&config.session)));
        let session = SessionController::new(gateway, coordinator.clone(), scheduler);

        let transport = Arc::new(AuthenticatedTransport::new(http, coordinator.clone()));
        let api = TaskflowApiClient::new(transport.clone());

        info!(
            base_url = %config.api.base_url,
            refresh_policy = %config.session.refresh_policy,
            credential_storage = %config.session.credential_storage,
            "session context ready"
        );

        Ok(Self { config, session, coordinator, transport, api, refresh_store })
    }

    /// Restore a session from the durable refresh credential.
    ///
    /// When the renewal response carries no identity, the member is fetched
    /// so the session converges before any authenticated work runs. Returns
    /// whether a session is established.
    pub async fn bootstrap(&self) -> bool {
        if !self.session.bootstrap().await {
            info!("no session to restore");
            return false;
        }

        if self.session.user().is_none() {
            match self.api.fetch_my_info().await {
                Ok(user) => self.session.set_user(user),
                Err(err) => warn!(error = %err, "restored session without identity"),
            }
        }
        self.session.is_authenticated()
    }

    /// Stop scheduled renewals without touching server state.
    pub fn shutdown(&self) {
        self.session.shutdown();
    }
}
