use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use taskflow_domain::{AuthGrant, UserIdentity};

/// Epoch milliseconds every test clock starts at.
pub const NOW_MILLIS: u64 = 1_700_000_000_000;

/// Unsigned JWT whose `exp` is `exp_secs` (epoch seconds).
pub fn jwt(label: &str, exp_secs: u64) -> String {
    let claims = format!(r#"{{"sub":"{label}","email":"kim@taskflow.dev","exp":{exp_secs}}}"#);
    format!("eyJhbGciOiJIUzUxMiJ9.{}.signature", URL_SAFE_NO_PAD.encode(claims))
}

/// Token valid for an hour from [`NOW_MILLIS`].
pub fn fresh_token(label: &str) -> String {
    jwt(label, NOW_MILLIS / 1000 + 3_600)
}

pub fn member() -> UserIdentity {
    UserIdentity {
        id: 42,
        email: "kim@taskflow.dev".into(),
        name: Some("Kim".into()),
        profile_image: None,
        provider: Some("LOCAL".into()),
    }
}

pub fn grant(token: &str, user: Option<UserIdentity>) -> AuthGrant {
    AuthGrant { access_token: token.to_string(), refresh_token: None, user }
}
