//! Error types used throughout the session subsystem

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for TaskFlow
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum TaskflowError {
    /// No response was received from the server.
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The access credential was refused on a first attempt.
    #[error("Authentication expired: {0}")]
    AuthenticationExpired(String),

    /// Terminal authentication failure.
    #[error("Authentication rejected: {0}")]
    AuthenticationRejected(String),

    /// Malformed server payload.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed credential claims.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Non-success HTTP status that is not an authentication failure.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Security error: {0}")]
    Security(String),

    /// Operation not permitted in the current session phase.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskflowError {
    /// Whether this error means the caller is not (or no longer) authenticated.
    #[must_use]
    pub const fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::AuthenticationExpired(_) | Self::AuthenticationRejected(_))
    }

    /// Whether this error means no response was received.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::NetworkUnavailable(_))
    }

    /// Collapse payload validation failures into an authentication rejection.
    ///
    /// Login and renewal responses that cannot be interpreted leave the
    /// client without a usable credential, which callers must treat the
    /// same way as an explicit refusal.
    #[must_use]
    pub fn into_rejection(self) -> Self {
        match self {
            Self::Validation(message) => Self::AuthenticationRejected(message),
            other => other,
        }
    }

    /// Stable label suitable for structured logging.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NetworkUnavailable(_) => "network_unavailable",
            Self::AuthenticationExpired(_) => "authentication_expired",
            Self::AuthenticationRejected(_) => "authentication_rejected",
            Self::Validation(_) => "validation",
            Self::Decode(_) => "decode",
            Self::Http { .. } => "http",
            Self::Config(_) => "config",
            Self::Security(_) => "security",
            Self::InvalidState(_) => "invalid_state",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for TaskFlow operations
pub type Result<T> = std::result::Result<T, TaskflowError>;
