use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use taskflow_core::HttpTransport;
use taskflow_domain::{ApiRequest, ApiResponse, Result};

/// Application server that accepts exactly one bearer token.
#[derive(Default)]
pub struct ScriptedServer {
    accepted: Mutex<Option<String>>,
    received: Mutex<Vec<ApiRequest>>,
}

impl ScriptedServer {
    /// Accept `token` from now on; every other bearer gets a 401.
    pub fn accept(&self, token: &str) {
        *self.accepted.lock().unwrap() = Some(format!("Bearer {token}"));
    }

    pub fn received(&self) -> Vec<ApiRequest> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedServer {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let authorized = {
            let accepted = self.accepted.lock().unwrap();
            accepted.is_some() && accepted.as_deref() == request.authorization()
        };
        let path = request.path.clone();
        self.received.lock().unwrap().push(request);

        if authorized {
            Ok(ApiResponse::json_body(200, &json!({ "path": path })))
        } else {
            Ok(ApiResponse::json_body(401, &json!({ "message": "token expired" })))
        }
    }
}
