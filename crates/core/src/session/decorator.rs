//! Bearer attachment and retry-once on 401
//!
//! [`AuthenticatedTransport`] wraps the raw transport used for application
//! calls. Authentication endpoints must keep using the raw transport;
//! routing a renewal through this wrapper would recurse.

use std::sync::Arc;

use async_trait::async_trait;
use taskflow_domain::{ApiRequest, ApiResponse, Credential, Result, TaskflowError};
use tracing::{debug, instrument, warn};

use super::ports::{CredentialStore, HttpTransport};
use super::renewal::RenewalCoordinator;

/// Transport that authenticates outgoing requests.
pub struct AuthenticatedTransport {
    inner: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialStore>,
    coordinator: RenewalCoordinator,
}

impl AuthenticatedTransport {
    /// Wrap `inner`. Credentials are read from the coordinator's store.
    pub fn new(inner: Arc<dyn HttpTransport>, coordinator: RenewalCoordinator) -> Self {
        let credentials = Arc::clone(coordinator.credentials());
        Self { inner, credentials, coordinator }
    }

    /// Credential to replay with after `attached` was refused.
    ///
    /// If another caller already replaced the credential, that one is used
    /// without a new renewal.
    async fn replacement_for(&self, attached: Option<&Credential>) -> Result<Credential> {
        match self.credentials.get() {
            Some(current) if Some(&current) != attached => {
                debug!("credential changed while request was in flight; replaying without renewal");
                Ok(current)
            }
            _ => self.coordinator.renew().await,
        }
    }
}

#[async_trait]
impl HttpTransport for AuthenticatedTransport {
    #[instrument(skip(self, request), fields(request_id = %request.id, path = %request.path))]
    async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        let attached = self.credentials.get();
        if let Some(credential) = &attached {
            request.set_authorization(credential.bearer());
        }

        let response = self.inner.send(request.clone()).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        if request.retried {
            warn!("request refused again after renewal");
            return Err(TaskflowError::AuthenticationRejected(
                "credential refused after renewal".into(),
            ));
        }

        let expired = TaskflowError::AuthenticationExpired(response.error_message());
        debug!(error = %expired, "renewing credential before replay");

        request.retried = true;
        let credential = self.replacement_for(attached.as_ref()).await?;
        request.set_authorization(credential.bearer());

        let replayed = self.inner.send(request).await?;
        if replayed.is_unauthorized() {
            warn!("replayed request refused");
            return Err(TaskflowError::AuthenticationRejected(
                "credential refused after renewal".into(),
            ));
        }
        Ok(replayed)
    }
}
