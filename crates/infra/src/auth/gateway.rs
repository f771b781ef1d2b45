//! HTTP implementation of the authentication gateway
//!
//! Must be given the raw transport, never the authenticated one: the
//! renewal call would otherwise re-enter the renewal protocol.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use taskflow_core::{AuthGateway, HttpTransport};
use taskflow_domain::{
    ApiRequest, ApiResponse, AuthGrant, Credential, LoginRequest, OAuthCallback, OAuthProvider,
    RefreshCredential, RegisterRequest, Result, TaskflowError, UserIdentity,
};
use tracing::{debug, instrument};

pub const LOGIN_PATH: &str = "/api/member/login";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const REGISTER_PATH: &str = "/api/member/regist";

/// Grant body shared by login, OAuth callback and renewal responses.
///
/// The identity arrives nested under `member`/`user` or, from the OAuth
/// callback, flattened next to the tokens.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GrantPayload {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default, alias = "user")]
    member: Option<UserIdentity>,
}

/// Gateway for the TaskFlow member API.
pub struct HttpAuthGateway {
    transport: Arc<dyn HttpTransport>,
    logout_path: String,
}

impl HttpAuthGateway {
    pub fn new(transport: Arc<dyn HttpTransport>, logout_path: impl Into<String>) -> Self {
        Self { transport, logout_path: logout_path.into() }
    }

    async fn exchange(&self, request: ApiRequest) -> Result<AuthGrant> {
        let response = self.transport.send(request).await?;
        read_grant(&response)
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn login(&self, request: LoginRequest) -> Result<AuthGrant> {
        self.exchange(ApiRequest::post(LOGIN_PATH).with_json(&request)?).await
    }

    #[instrument(skip(self, callback))]
    async fn oauth_callback(
        &self,
        provider: OAuthProvider,
        callback: OAuthCallback,
    ) -> Result<AuthGrant> {
        self.exchange(ApiRequest::post(provider.callback_path()).with_json(&callback)?).await
    }

    async fn refresh(&self, refresh: &RefreshCredential) -> Result<AuthGrant> {
        let body = refresh.body_token().map_or_else(|| json!({}), |token| json!({ "refreshToken": token }));
        debug!(credential = ?refresh, "posting renewal");
        self.exchange(ApiRequest::post(REFRESH_PATH).with_json(&body)?).await
    }

    async fn logout(
        &self,
        access: Option<&Credential>,
        refresh: Option<&RefreshCredential>,
    ) -> Result<()> {
        let body = refresh
            .and_then(RefreshCredential::body_token)
            .map_or_else(|| json!({}), |token| json!({ "refreshToken": token }));
        let mut request = ApiRequest::post(&self.logout_path).with_json(&body)?;
        if let Some(credential) = access {
            request.set_authorization(credential.bearer());
        }

        let response = self.transport.send(request).await?;
        check_status(&response)
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn register(&self, request: RegisterRequest) -> Result<()> {
        let response =
            self.transport.send(ApiRequest::post(REGISTER_PATH).with_json(&request)?).await?;
        check_status(&response)
    }
}

fn check_status(response: &ApiResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    let message = response.error_message();
    Err(match response.status {
        401 | 403 => TaskflowError::AuthenticationRejected(message),
        status => TaskflowError::Http { status, message },
    })
}

fn read_grant(response: &ApiResponse) -> Result<AuthGrant> {
    check_status(response)?;

    let payload: GrantPayload = response.json()?;
    let access_token = payload
        .access_token
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| TaskflowError::Validation("response carried no accessToken".into()))?;

    let user = payload.member.or_else(|| response.json::<UserIdentity>().ok());

    Ok(AuthGrant { access_token, refresh_token: payload.refresh_token, user })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn grant_accepts_member_or_user() {
        let member = json!({ "accessToken": "a", "member": { "id": 1, "email": "m@t.dev" } });
        let user = json!({ "accessToken": "a", "user": { "id": 2, "email": "u@t.dev" } });

        let from_member = read_grant(&ApiResponse::json_body(200, &member)).unwrap();
        let from_user = read_grant(&ApiResponse::json_body(200, &user)).unwrap();

        assert_eq!(from_member.user.unwrap().id, 1);
        assert_eq!(from_user.user.unwrap().id, 2);
    }

    #[test]
    fn grant_reads_flat_identity() {
        let flat = json!({ "accessToken": "a", "id": 3, "email": "f@t.dev", "name": "Flat" });
        let tokens_only = json!({ "accessToken": "a", "refreshToken": "r" });

        let user = read_grant(&ApiResponse::json_body(200, &flat)).unwrap().user.unwrap();
        assert_eq!((user.id, user.display_name()), (3, "Flat"));
        assert!(read_grant(&ApiResponse::json_body(200, &tokens_only)).unwrap().user.is_none());
    }

    #[test]
    fn grant_without_access_token_is_invalid() {
        let body = json!({ "member": { "id": 1, "email": "m@t.dev" } });
        let err = read_grant(&ApiResponse::json_body(200, &body)).unwrap_err();
        assert!(matches!(err, TaskflowError::Validation(_)));

        let blank = json!({ "accessToken": "  " });
        assert!(read_grant(&ApiResponse::json_body(200, &blank)).is_err());
        assert!(read_grant(&ApiResponse::new(200, Vec::new())).is_err());
    }

    #[test]
    fn grant_keeps_rotated_refresh_token() {
        let body = json!({ "accessToken": "a", "refreshToken": "r2" });
        let grant = read_grant(&ApiResponse::json_body(200, &body)).unwrap();
        assert_eq!(grant.refresh_token.as_deref(), Some("r2"));
        assert!(grant.user.is_none());
    }

    #[test]
    fn refused_status_maps_to_rejection() {
        let err = check_status(&ApiResponse::json_body(401, &json!({ "message": "nope" })))
            .unwrap_err();
        assert_eq!(err, TaskflowError::AuthenticationRejected("nope".into()));

        let err = check_status(&ApiResponse::new(400, "duplicate email")).unwrap_err();
        assert_eq!(
            err,
            TaskflowError::Http { status: 400, message: "duplicate email".into() }
        );
    }

    mod http {
        use std::sync::Arc;

        use wiremock::matchers::{body_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        use super::*;
        use crate::http::HttpClient;

        fn gateway(server: &MockServer) -> HttpAuthGateway {
            let client = HttpClient::builder().base_url(server.uri()).build().unwrap();
            HttpAuthGateway::new(Arc::new(client), "/auth/logout")
        }

        #[tokio::test]
        async fn test_refresh_sends_body_token() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path(REFRESH_PATH))
                .and(body_json(json!({ "refreshToken": "r1" })))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "a2" })),
                )
                .expect(1)
                .mount(&server)
                .await;

            let grant =
                gateway(&server).refresh(&RefreshCredential::Token("r1".into())).await.unwrap();

            assert_eq!(grant.access_token, "a2");
        }

        #[tokio::test]
        async fn test_oauth_callback_posts_code_to_provider_route() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/oauth/naver/callback"))
                .and(body_json(json!({ "code": "c1", "state": "s1" })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "accessToken": "a1",
                    "member": { "id": 5, "email": "n@taskflow.dev", "provider": "NAVER" },
                })))
                .expect(1)
                .mount(&server)
                .await;

            let callback = OAuthCallback { code: "c1".into(), state: Some("s1".into()) };
            let grant =
                gateway(&server).oauth_callback(OAuthProvider::Naver, callback).await.unwrap();

            assert_eq!(grant.user.unwrap().provider.as_deref(), Some("NAVER"));
        }

        #[tokio::test]
        async fn test_oauth_callback_reads_flat_member_body() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/oauth/google/callback"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "id": 9,
                    "name": "Kim",
                    "email": "kim@taskflow.dev",
                    "provider": "GOOGLE",
                    "accessToken": "a9",
                })))
                .expect(1)
                .mount(&server)
                .await;

            let callback = OAuthCallback { code: "c9".into(), state: None };
            let grant =
                gateway(&server).oauth_callback(OAuthProvider::Google, callback).await.unwrap();

            assert_eq!(grant.access_token, "a9");
            let user = grant.user.unwrap();
            assert_eq!(user.id, 9);
            assert_eq!(user.email, "kim@taskflow.dev");
            assert_eq!(user.provider.as_deref(), Some("GOOGLE"));
        }

        #[tokio::test]
        async fn test_register_accepts_created_and_surfaces_conflict() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path(REGISTER_PATH))
                .respond_with(ResponseTemplate::new(201))
                .up_to_n_times(1)
                .mount(&server)
                .await;
            Mock::given(method("POST"))
                .and(path(REGISTER_PATH))
                .respond_with(
                    ResponseTemplate::new(409).set_body_json(json!({ "message": "email taken" })),
                )
                .mount(&server)
                .await;

            let request = RegisterRequest {
                name: "Kim".into(),
                email: "kim@taskflow.dev".into(),
                password: "pw".into(),
            };
            let gateway = gateway(&server);

            gateway.register(request.clone()).await.unwrap();
            let err = gateway.register(request).await.unwrap_err();

            assert_eq!(err, TaskflowError::Http { status: 409, message: "email taken".into() });
        }

        #[tokio::test]
        async fn test_logout_without_credentials_sends_empty_body() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/auth/logout"))
                .and(body_json(json!({})))
                .respond_with(ResponseTemplate::new(204))
                .expect(1)
                .mount(&server)
                .await;

            gateway(&server).logout(None, Some(&RefreshCredential::Cookie)).await.unwrap();

            let received = server.received_requests().await.unwrap();
            assert!(received[0].headers.get("authorization").is_none());
        }
    }
}
