//! Typed API client

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use taskflow_core::HttpTransport;
use taskflow_domain::{ApiRequest, ApiResponse, Result, TaskflowError, UserIdentity};
use tracing::{debug, instrument};

pub const PROFILE_PATH: &str = "/api/member/profile";
pub const FETCH_MY_INFO_PATH: &str = "/api/member/fetchMyInfo";

/// JSON client for authenticated member endpoints.
///
/// Give it the decorated transport so every call carries the bearer and
/// survives one credential renewal.
#[derive(Clone)]
pub struct TaskflowApiClient {
    transport: Arc<dyn HttpTransport>,
}

impl TaskflowApiClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// GET `path` and decode the body.
    ///
    /// # Errors
    /// - `TaskflowError::AuthenticationRejected` on 401/403 after renewal
    /// - `TaskflowError::Http` on any other non-success status
    /// - `TaskflowError::Validation` if the body does not decode as `T`
    /// - `TaskflowError::NetworkUnavailable` if no response arrived
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.call(ApiRequest::get(path)).await
    }

    /// POST `body` as JSON to `path` and decode the response.
    ///
    /// # Errors
    /// Same as [`TaskflowApiClient::get`].
    #[instrument(skip(self, body))]
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        self.call(ApiRequest::post(path).with_json(body)?).await
    }

    /// Profile of the signed-in member.
    pub async fn profile(&self) -> Result<UserIdentity> {
        self.get(PROFILE_PATH).await
    }

    /// Identity lookup used to converge the session after a silent renewal.
    pub async fn fetch_my_info(&self) -> Result<UserIdentity> {
        self.get(FETCH_MY_INFO_PATH).await
    }

    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.transport.send(request).await?;
        debug!(status = response.status, "api response");
        decode(&response)
    }
}

fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T> {
    match response.status {
        204 | 205 => serde_json::from_value(serde_json::Value::Null).map_err(|e| {
            TaskflowError::Validation(format!("empty response cannot decode: {e}"))
        }),
        status if (200..300).contains(&status) => response.json(),
        401 | 403 => Err(TaskflowError::AuthenticationRejected(response.error_message())),
        status => Err(TaskflowError::Http { status, message: response.error_message() }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn no_content_decodes_as_unit() {
        decode::<()>(&ApiResponse::new(204, Vec::new())).unwrap();
        let optional: Option<UserIdentity> = decode(&ApiResponse::new(205, Vec::new())).unwrap();
        assert!(optional.is_none());
    }

    #[test]
    fn error_statuses_carry_server_message() {
        let forbidden = decode::<serde_json::Value>(&ApiResponse::json_body(
            403,
            &json!({ "message": "not yours" }),
        ))
        .unwrap_err();
        assert_eq!(forbidden, TaskflowError::AuthenticationRejected("not yours".into()));

        let missing =
            decode::<serde_json::Value>(&ApiResponse::new(404, "no such task")).unwrap_err();
        assert_eq!(missing, TaskflowError::Http { status: 404, message: "no such task".into() });
    }

    #[test]
    fn success_decodes_identity() {
        let body = json!({ "id": 7, "email": "lee@taskflow.dev", "name": "Lee" });
        let user: UserIdentity = decode(&ApiResponse::json_body(200, &body)).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.name.as_deref(), Some("Lee"));
    }
}
