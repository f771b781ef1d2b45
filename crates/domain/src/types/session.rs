//! Session state types

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Lifecycle phase of the user session.
///
/// `LoggedOut -> LoggingIn -> Authenticated -> LoggingOut -> LoggedOut`, with
/// `Authenticated -> Authenticated` on silent renewal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    LoggedOut,
    LoggingIn,
    Authenticated,
    LoggingOut,
}

impl_domain_status_conversions!(SessionPhase {
    LoggedOut => "logged_out",
    LoggingIn => "logging_in",
    Authenticated => "authenticated",
    LoggingOut => "logging_out",
});

/// Whether a renewal network call is outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalPhase {
    #[default]
    Idle,
    InFlight,
}

impl_domain_status_conversions!(RenewalPhase {
    Idle => "idle",
    InFlight => "in_flight",
});

/// Signals published to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Login or bootstrap established a session.
    Authenticated { user: Option<UserIdentity> },
    /// The access credential was silently replaced.
    Renewed,
    /// Local session state has been cleared.
    LoggedOut,
    /// The UI should navigate to the login entry point.
    RedirectToLogin,
}

/// Identity of the authenticated member.
///
/// Servers send `name` or `username` depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: i64,
    pub email: String,
    #[serde(default, alias = "username")]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    /// `LOCAL`, `GOOGLE`, `NAVER` or `KAKAO`.
    #[serde(default)]
    pub provider: Option<String>,
}

impl UserIdentity {
    /// Name to show in the UI, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|name| !name.is_empty()).unwrap_or(&self.email)
    }
}
