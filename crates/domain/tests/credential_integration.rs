//! Integration tests for credential and envelope types
//!
//! Exercises the public API the way the session layer uses it.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde_json::json;
use taskflow_domain::{
    ApiRequest, ApiResponse, Claims, Credential, HttpMethod, SessionEvent, TaskflowError,
    UserIdentity,
};

const NOW_MILLIS: i64 = 1_700_000_000_000;

fn token_with(claims: &serde_json::Value) -> String {
    format!("eyJhbGciOiJIUzUxMiJ9.{}.sig", URL_SAFE_NO_PAD.encode(claims.to_string()))
}

#[test]
fn test_issue_accepts_future_expiry() {
    let token = token_with(&json!({ "sub": "42", "exp": NOW_MILLIS / 1000 + 60 }));

    let credential = Credential::issue(token.clone(), NOW_MILLIS).unwrap();

    assert_eq!(credential.token(), token);
    assert_eq!(credential.expires_at_millis().unwrap(), NOW_MILLIS + 60_000);
    assert_eq!(credential.bearer(), format!("Bearer {token}"));
    assert!(!credential.is_expired_at(NOW_MILLIS));
}

#[test]
fn test_issue_rejects_expired_and_empty_tokens() {
    let expired = token_with(&json!({ "exp": NOW_MILLIS / 1000 }));

    assert!(matches!(
        Credential::issue(expired, NOW_MILLIS),
        Err(TaskflowError::AuthenticationRejected(_))
    ));
    assert!(matches!(Credential::issue("  ", NOW_MILLIS), Err(TaskflowError::Validation(_))));
}

#[test]
fn test_undecodable_token_is_kept_without_expiry() {
    let credential = Credential::issue("opaque-session-token", NOW_MILLIS).unwrap();

    assert!(matches!(credential.expires_at_millis(), Err(TaskflowError::Decode(_))));
    assert!(!credential.is_expired_at(i64::MAX));
}

#[test]
fn test_claims_accept_fractional_exp_and_padded_standard_alphabet() {
    let claims = json!({ "exp": 1_700_000_060.5, "email": "kim@taskflow.dev", "role": "USER" });
    let token = format!("h.{}.s", STANDARD.encode(claims.to_string()));

    let decoded = Claims::decode(&token).unwrap();

    assert_eq!(decoded.expires_at_millis().unwrap(), 1_700_000_060_500);
    assert_eq!(decoded.email.as_ref().and_then(|v| v.as_str()), Some("kim@taskflow.dev"));
    assert_eq!(decoded.role.as_ref().and_then(|v| v.as_str()), Some("USER"));
}

#[test]
fn test_debug_never_prints_token() {
    let token = token_with(&json!({ "exp": NOW_MILLIS / 1000 + 60 }));
    let credential = Credential::issue(token.clone(), NOW_MILLIS).unwrap();

    let rendered = format!("{credential:?}");

    assert!(!rendered.contains(&token));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn test_request_builder_and_response_helpers() {
    let mut request = ApiRequest::post("/api/member/login")
        .with_json(&json!({ "email": "kim@taskflow.dev" }))
        .unwrap()
        .with_query("lang", "ko");
    request.set_authorization("Bearer a");

    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.authorization(), Some("Bearer a"));
    assert!(!request.retried);

    let response = ApiResponse::json_body(401, &json!({ "message": "token expired" }));
    assert!(response.is_unauthorized());
    assert!(!response.is_success());
    assert_eq!(response.error_message(), "token expired");
}

#[test]
fn test_identity_and_events_serialize() {
    let identity: UserIdentity =
        serde_json::from_value(json!({ "id": 1, "email": "a@taskflow.dev" })).unwrap();
    assert_eq!(identity.display_name(), "a@taskflow.dev");

    let event = SessionEvent::Authenticated { user: Some(identity) };
    let round: SessionEvent = serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
    assert_eq!(round, event);
}

#[test]
fn test_error_classification() {
    assert!(TaskflowError::AuthenticationRejected("x".into()).is_authentication_failure());
    assert!(TaskflowError::AuthenticationExpired("x".into()).is_authentication_failure());
    assert!(TaskflowError::NetworkUnavailable("x".into()).is_network());
    assert_eq!(
        TaskflowError::Validation("no accessToken".into()).into_rejection(),
        TaskflowError::AuthenticationRejected("no accessToken".into())
    );
}
