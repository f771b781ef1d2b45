//! Port interfaces for session management
//!
//! These traits define the boundaries between the session logic and
//! infrastructure implementations.

use async_trait::async_trait;
use taskflow_domain::{
    ApiRequest, ApiResponse, AuthGrant, Credential, LoginRequest, OAuthCallback, OAuthProvider,
    RefreshCredential, RegisterRequest, Result, TaskflowError, UserIdentity,
};

/// Outbound request pipeline
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request.
    ///
    /// Any received response is `Ok`, whatever its status. `Err` means no
    /// response was obtained (`TaskflowError::NetworkUnavailable`) or the
    /// request could not be built.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Server-side authentication operations
///
/// Implementations must use a transport that is *not* wrapped by the
/// request decorator.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange email and password for a grant.
    async fn login(&self, request: LoginRequest) -> Result<AuthGrant>;

    /// Exchange a provider authorization code for a grant.
    async fn oauth_callback(
        &self,
        provider: OAuthProvider,
        callback: OAuthCallback,
    ) -> Result<AuthGrant>;

    /// Obtain a new access credential using the durable refresh credential.
    async fn refresh(&self, refresh: &RefreshCredential) -> Result<AuthGrant>;

    /// Revoke the durable credential server-side.
    async fn logout(
        &self,
        access: Option<&Credential>,
        refresh: Option<&RefreshCredential>,
    ) -> Result<()>;

    /// Create a member account.
    async fn register(&self, request: RegisterRequest) -> Result<()>;
}

/// Holder of the current access credential
///
/// Operations never suspend, so readers never observe a partial write.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<Credential>;

    fn set(&self, credential: Credential);

    fn clear(&self);
}

/// Holder of the durable refresh credential
pub trait RefreshCredentialStore: Send + Sync {
    /// Current refresh credential, or `None` when renewal is known to be
    /// impossible.
    fn load(&self) -> Result<Option<RefreshCredential>>;

    /// Persist a rotated refresh token.
    fn save(&self, token: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Receives renewal outcomes
///
/// Callbacks run synchronously on the renewal task, while the coordinator's
/// state lock is held and before any waiter is settled. They must not call
/// back into the coordinator synchronously.
pub trait RenewalListener: Send + Sync {
    fn renewed(&self, credential: &Credential, user: Option<&UserIdentity>);

    fn renewal_failed(&self, error: &TaskflowError);
}

/// Target of scheduled renewals
#[async_trait]
pub trait RenewalTrigger: Send + Sync {
    async fn trigger_renewal(&self);
}
