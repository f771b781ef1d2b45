//! Transport-neutral request and response envelopes
//!
//! These types let the session layer decorate and replay requests without
//! depending on a concrete HTTP client.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Result, TaskflowError};
use crate::impl_domain_status_conversions;

/// Name of the bearer credential header.
pub const AUTHORIZATION: &str = "Authorization";

/// HTTP status that signals a missing or refused credential.
pub const STATUS_UNAUTHORIZED: u16 = 401;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl_domain_status_conversions!(HttpMethod {
    Get => "get",
    Head => "head",
    Post => "post",
    Put => "put",
    Patch => "patch",
    Delete => "delete",
    Options => "options",
});

impl HttpMethod {
    /// Safe to resend after a transport failure.
    #[must_use]
    pub const fn is_idempotent(self) -> bool {
        !matches!(self, Self::Post | Self::Patch)
    }
}

/// Outbound request description.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Correlation id for logs.
    pub id: Uuid,
    pub method: HttpMethod,
    /// Path relative to the configured API origin, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<serde_json::Value>,
    /// Set once the request has been replayed after a renewal.
    pub retried: bool,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    /// Returns `TaskflowError::Validation` if `body` cannot be serialized.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| TaskflowError::Validation(format!("failed to serialize body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace any `Authorization` header with the given bearer value.
    pub fn set_authorization(&mut self, value: impl Into<String>) {
        self.headers.insert(AUTHORIZATION.to_string(), value.into());
    }

    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.headers.get(AUTHORIZATION).map(String::as_str)
    }
}

/// Received response. Any status, including errors, is a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, headers: BTreeMap::new(), body: body.into() }
    }

    /// Convenience constructor for JSON bodies.
    #[must_use]
    pub fn json_body(status: u16, value: &serde_json::Value) -> Self {
        let mut response = Self::new(status, value.to_string());
        response.headers.insert("content-type".into(), "application/json".into());
        response
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == STATUS_UNAUTHORIZED
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body. An empty body is treated as JSON `null`.
    ///
    /// # Errors
    /// Returns `TaskflowError::Validation` if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let parsed = if self.body.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_value(serde_json::Value::Null)
        } else {
            serde_json::from_slice(&self.body)
        };
        parsed.map_err(|e| {
            TaskflowError::Validation(format!(
                "unexpected response body (status {}): {e}",
                self.status
            ))
        })
    }

    /// Server-provided `message` field, falling back to the raw body.
    #[must_use]
    pub fn error_message(&self) -> String {
        serde_json::from_slice::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(str::to_owned))
            .unwrap_or_else(|| self.text())
    }
}
