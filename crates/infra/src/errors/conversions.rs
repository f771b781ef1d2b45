//! Conversions from external infrastructure errors into domain errors.

use keyring::Error as KeyringError;
use reqwest::Error as HttpError;
use taskflow_common::security::KeychainError;
use taskflow_domain::TaskflowError;
use thiserror::Error;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct InfraError(pub TaskflowError);

impl From<InfraError> for TaskflowError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TaskflowError> for InfraError {
    fn from(value: TaskflowError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoTaskflowError {
    fn into_taskflow(self) -> TaskflowError;
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → TaskflowError */
/* -------------------------------------------------------------------------- */

impl IntoTaskflowError for KeyringError {
    fn into_taskflow(self) -> TaskflowError {
        use KeyringError::{
            Ambiguous, BadEncoding, Invalid, NoEntry, NoStorageAccess, PlatformFailure, TooLong,
        };

        let description = self.to_string();

        match self {
            NoEntry => TaskflowError::Security("keychain entry not found".into()),
            BadEncoding(_) => {
                TaskflowError::Security("credential in keychain is not valid UTF-8".into())
            }
            TooLong(name, limit) => TaskflowError::Security(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            Invalid(attr, reason) => {
                TaskflowError::Security(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            Ambiguous(entries) => TaskflowError::Security(format!(
                "multiple keychain entries matched request ({} results)",
                entries.len()
            )),
            PlatformFailure(err) => {
                TaskflowError::Security(format!("keychain platform error: {err}"))
            }
            NoStorageAccess(err) => {
                TaskflowError::Security(format!("unable to access secure storage: {err}"))
            }
            _ => TaskflowError::Security(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        Self(value.into_taskflow())
    }
}

/* -------------------------------------------------------------------------- */
/* KeychainError → TaskflowError */
/* -------------------------------------------------------------------------- */

impl IntoTaskflowError for KeychainError {
    fn into_taskflow(self) -> TaskflowError {
        match self {
            KeychainError::Keyring(err) => err.into_taskflow(),
            KeychainError::NotFound => TaskflowError::Security("keychain entry not found".into()),
            KeychainError::AccessFailed(message) => TaskflowError::Security(message),
        }
    }
}

impl From<KeychainError> for InfraError {
    fn from(value: KeychainError) -> Self {
        Self(value.into_taskflow())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TaskflowError */
/* -------------------------------------------------------------------------- */

impl IntoTaskflowError for HttpError {
    fn into_taskflow(self) -> TaskflowError {
        if self.is_timeout() {
            return TaskflowError::NetworkUnavailable("HTTP request timed out".into());
        }

        if self.is_connect() {
            return TaskflowError::NetworkUnavailable("HTTP connection failure".into());
        }

        if self.is_builder() {
            return TaskflowError::Internal(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => TaskflowError::AuthenticationRejected(message),
                _ => TaskflowError::Http { status: code, message },
            };
        }

        TaskflowError::NetworkUnavailable(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_taskflow())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → TaskflowError */
/* -------------------------------------------------------------------------- */

impl IntoTaskflowError for UrlError {
    fn into_taskflow(self) -> TaskflowError {
        TaskflowError::Config(format!("invalid URL: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        Self(value.into_taskflow())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
