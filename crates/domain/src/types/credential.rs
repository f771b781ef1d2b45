//! Access and refresh credentials
//!
//! The access credential is an opaque bearer token whose middle segment
//! carries JSON claims. Only the `exp` claim matters to the session; the
//! signature is never checked client-side.

use std::fmt;

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{Result, TaskflowError};

/// Claims payload embedded in an access credential.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Claims {
    /// Expiry in seconds since the UNIX epoch (integer or fractional).
    #[serde(default)]
    pub exp: Option<Value>,
    /// Informational claims; issuers disagree on their JSON types.
    #[serde(default)]
    pub sub: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub role: Option<Value>,
}

impl Claims {
    /// Decode the claims segment of a bearer token.
    ///
    /// Accepts both URL-safe and standard base64 alphabets, with or without
    /// padding.
    ///
    /// # Errors
    /// Returns `TaskflowError::Decode` when the token has no claims segment,
    /// the segment is not base64, or it does not hold a JSON object.
    pub fn decode(token: &str) -> Result<Self> {
        let segment = token
            .split('.')
            .nth(1)
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| TaskflowError::Decode("credential has no claims segment".into()))?;
        let segment = segment.trim_end_matches('=');

        let bytes = URL_SAFE_NO_PAD
            .decode(segment)
            .or_else(|_| STANDARD_NO_PAD.decode(segment))
            .map_err(|e| TaskflowError::Decode(format!("claims are not base64: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| TaskflowError::Decode(format!("claims are not a JSON object: {e}")))
    }

    /// Expiry converted to epoch milliseconds.
    ///
    /// # Errors
    /// Returns `TaskflowError::Decode` when `exp` is absent or not numeric.
    pub fn expires_at_millis(&self) -> Result<i64> {
        let seconds = match &self.exp {
            Some(Value::Number(number)) => number,
            Some(other) => {
                return Err(TaskflowError::Decode(format!("exp claim is not numeric: {other}")))
            }
            None => return Err(TaskflowError::Decode("exp claim is missing".into())),
        };

        if let Some(whole) = seconds.as_i64() {
            return Ok(whole.saturating_mul(1000));
        }

        seconds
            .as_f64()
            .filter(|value| value.is_finite())
            .map(|value| (value * 1000.0).round() as i64)
            .ok_or_else(|| TaskflowError::Decode(format!("exp claim out of range: {seconds}")))
    }
}

/// Short-lived bearer credential.
///
/// Expiry is decoded once at construction. A token whose claims cannot be
/// decoded is still usable; it simply has no known expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expiry: Result<i64>,
}

impl Credential {
    /// Wrap a token without validating its expiry.
    ///
    /// Used when reloading a credential that was already accepted once.
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let expiry = Claims::decode(&token).and_then(|claims| claims.expires_at_millis());
        Self { token, expiry }
    }

    /// Accept a freshly issued token.
    ///
    /// # Errors
    /// - `TaskflowError::Validation` if the token is empty.
    /// - `TaskflowError::AuthenticationRejected` if the decoded expiry is not
    ///   strictly after `now_millis`.
    pub fn issue(token: impl Into<String>, now_millis: i64) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(TaskflowError::Validation("access credential is empty".into()));
        }

        let credential = Self::from_token(token);
        if let Ok(&expires_at) = credential.expiry.as_ref() {
            if expires_at <= now_millis {
                return Err(TaskflowError::AuthenticationRejected(format!(
                    "issued credential already expired {} ms ago",
                    now_millis.saturating_sub(expires_at)
                )));
            }
        }

        Ok(credential)
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// `Authorization` header value.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Decoded expiry in epoch milliseconds.
    ///
    /// # Errors
    /// Returns `TaskflowError::Decode` if the claims could not be decoded.
    pub fn expires_at_millis(&self) -> Result<i64> {
        self.expiry.clone()
    }

    /// Decoded expiry as a UTC timestamp.
    ///
    /// # Errors
    /// Returns `TaskflowError::Decode` if the claims could not be decoded or
    /// the expiry is outside the representable range.
    pub fn expires_at(&self) -> Result<DateTime<Utc>> {
        let millis = self.expires_at_millis()?;
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| TaskflowError::Decode(format!("expiry {millis} out of range")))
    }

    /// `true` only when the expiry is known and not after `now_millis`.
    #[must_use]
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        matches!(self.expiry, Ok(expires_at) if expires_at <= now_millis)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Durable credential used solely to obtain new access credentials.
#[derive(Clone, PartialEq, Eq)]
pub enum RefreshCredential {
    /// HttpOnly cookie the transport sends on its own.
    Cookie,
    /// Refresh token sent explicitly in the renewal body.
    Token(String),
}

impl RefreshCredential {
    /// Token to put in the renewal body, if any.
    #[must_use]
    pub fn body_token(&self) -> Option<&str> {
        match self {
            Self::Cookie => None,
            Self::Token(token) => Some(token),
        }
    }
}

impl fmt::Debug for RefreshCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cookie => f.write_str("Cookie"),
            Self::Token(_) => f.write_str("Token(<redacted>)"),
        }
    }
}
