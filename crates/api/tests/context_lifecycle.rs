//! Integration tests for AppContext lifecycle
//!
//! Tests verify that the context wires the session against a real HTTP
//! transport and that each credential policy persists where configured.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::json;
use taskflow_common::security::SecretStore;
use taskflow_common::testing::MockKeychainProvider;
use taskflow_domain::{
    Config, CredentialStorage, LoginRequest, RefreshPolicy, SessionPhase, TaskflowError,
};
use taskflow_lib::context::AppContext;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token(label: &str) -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    let claims = format!(r#"{{"sub":"{label}","exp":{}}}"#, now + 3_600);
    format!("eyJhbGciOiJIUzUxMiJ9.{}.sig", URL_SAFE_NO_PAD.encode(claims))
}

fn member_json() -> serde_json::Value {
    json!({ "id": 42, "email": "kim@taskflow.dev", "username": "Kim" })
}

fn config_for(server: &MockServer, refresh: RefreshPolicy, storage: CredentialStorage) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.max_attempts = 1;
    config.session.refresh_policy = refresh;
    config.session.credential_storage = storage;
    config
}

/// Test that a fresh context with no durable credential stays logged out
///
/// This test verifies:
/// - Context creation succeeds with the default cookie policy
/// - Bootstrap makes no network call
#[tokio::test]
async fn test_bootstrap_without_credential_stays_logged_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let context = AppContext::with_secrets(
        config_for(&server, RefreshPolicy::Cookie, CredentialStorage::Memory),
        Arc::new(MockKeychainProvider::new()),
    )
    .unwrap();

    assert!(!context.bootstrap().await);
    assert_eq!(context.session.phase(), SessionPhase::LoggedOut);
}

/// Test keychain-held refresh token bootstrap
///
/// This test verifies:
/// - The stored token is sent in the renewal body
/// - The rotated token replaces it
/// - A missing identity is fetched with the renewed bearer
#[tokio::test]
async fn test_bootstrap_with_keychain_refresh_token() {
    let server = MockServer::start().await;
    let t2 = token("t2");

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "r1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": t2, "refreshToken": "r2" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/member/fetchMyInfo"))
        .and(header("authorization", format!("Bearer {t2}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(member_json()))
        .expect(1)
        .mount(&server)
        .await;

    let keychain = MockKeychainProvider::new();
    keychain.set_secret("refresh_token", "r1").unwrap();
    let context = AppContext::with_secrets(
        config_for(&server, RefreshPolicy::Keychain, CredentialStorage::Memory),
        Arc::new(keychain.clone()),
    )
    .unwrap();

    assert!(context.bootstrap().await);
    let user = context.session.user().unwrap();
    assert_eq!(user.display_name(), "Kim");
    assert_eq!(keychain.get_secret("refresh_token").unwrap(), "r2");
}

/// Test login and logout with every credential in the keychain
///
/// This test verifies:
/// - Login persists both the access credential and the refresh token
/// - Logout removes both even when the server call fails
#[tokio::test]
async fn test_logout_clears_keychain() {
    let server = MockServer::start().await;
    let t1 = token("t1");

    Mock::given(method("POST"))
        .and(path("/api/member/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": t1,
            "refreshToken": "r1",
            "member": member_json(),
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/member/logout"))
        .and(body_json(json!({ "refreshToken": "r1" })))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let keychain = MockKeychainProvider::new();
    let context = AppContext::with_secrets(
        config_for(&server, RefreshPolicy::Keychain, CredentialStorage::Keychain),
        Arc::new(keychain.clone()),
    )
    .unwrap();

    context.session.login(LoginRequest::new("kim@taskflow.dev", "pw")).await.unwrap();
    assert!(keychain.secret_exists("access_token"));
    assert!(keychain.secret_exists("refresh_token"));

    context.session.logout().await;
    context.shutdown();

    assert_eq!(context.session.phase(), SessionPhase::LoggedOut);
    assert!(keychain.is_empty());
}

/// Test that an unusable base URL is reported as a configuration error
#[test]
fn test_invalid_base_url_is_config_error() {
    let mut config = Config::default();
    config.api.base_url = "not a url".into();

    let result = AppContext::with_secrets(config, Arc::new(MockKeychainProvider::new()));

    assert!(matches!(result, Err(TaskflowError::Config(_))));
}
