//! Authentication request and response payloads

use std::fmt;

use serde::{Deserialize, Serialize};

use super::session::UserIdentity;
use crate::impl_domain_status_conversions;

/// Email/password login body.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Member registration body.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Social login providers with a server-side code exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Kakao,
    Naver,
}

impl_domain_status_conversions!(OAuthProvider {
    Google => "google",
    Kakao => "kakao",
    Naver => "naver",
});

impl OAuthProvider {
    /// Server route that exchanges the authorization code.
    #[must_use]
    pub fn callback_path(self) -> String {
        format!("/oauth/{self}/callback")
    }
}

/// Authorization code returned to the UI by a provider redirect.
#[derive(Debug, Clone, Serialize)]
pub struct OAuthCallback {
    pub code: String,
    /// Anti-forgery value; Naver requires it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Successful login or renewal outcome.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub access_token: String,
    /// Rotated refresh token, when the server returns one in the body.
    pub refresh_token: Option<String>,
    pub user: Option<UserIdentity>,
}

impl fmt::Debug for AuthGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGrant")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .finish()
    }
}
