//! Domain types and models

pub mod auth;
pub mod credential;
pub mod http;
pub mod session;

pub use auth::{AuthGrant, LoginRequest, OAuthCallback, OAuthProvider, RegisterRequest};
pub use credential::{Claims, Credential, RefreshCredential};
pub use http::{ApiRequest, ApiResponse, HttpMethod, AUTHORIZATION, STATUS_UNAUTHORIZED};
pub use session::{RenewalPhase, SessionEvent, SessionPhase, UserIdentity};
