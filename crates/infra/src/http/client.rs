use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client as ReqwestClient, Method, Response};
use taskflow_core::HttpTransport;
use taskflow_domain::{ApiConfig, ApiRequest, ApiResponse, HttpMethod, TaskflowError};
use tracing::debug;
use url::Url;

use crate::errors::InfraError;

/// HTTP client with built-in retry and timeout support.
///
/// Only idempotent methods are retried. A 401 is returned as a response,
/// never retried here.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    base_url: Url,
    max_attempts: usize,
    base_backoff: Duration,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("max_attempts", &self.max_attempts)
            .field("base_backoff", &self.base_backoff)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Builder preset from the `api` section of the configuration.
    pub fn builder_for(config: &ApiConfig) -> HttpClientBuilder {
        Self::builder()
            .base_url(&config.base_url)
            .timeout(config.timeout())
            .max_attempts(config.max_attempts)
            .user_agent(&config.user_agent)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for `request`, including its query string.
    fn url_for(&self, request: &ApiRequest) -> Result<Url, TaskflowError> {
        let mut url = self.base_url.join(&request.path).map_err(InfraError::from)?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    fn build_request(&self, request: &ApiRequest) -> Result<reqwest::Request, TaskflowError> {
        let url = self.url_for(request)?;
        let mut builder =
            self.client.request(to_method(request.method), url).headers(to_headers(&request.headers)?);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        builder.build().map_err(|err| InfraError::from(err).into())
    }

    /// Execute `request` with retry semantics.
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TaskflowError> {
        let attempts = if request.method.is_idempotent() { self.max_attempts.max(1) } else { 1 };

        for attempt in 0..attempts {
            let built = self.build_request(request)?;
            let method = built.method().clone();
            let url = built.url().clone();
            debug!(attempt = attempt + 1, %method, %url, request_id = %request.id, "sending HTTP request");

            match self.client.execute(built).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %method, %url, %status, "received HTTP response");

                    if status.is_server_error() && attempt + 1 < attempts {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    return read_response(response).await;
                }
                Err(err) => {
                    debug!(attempt = attempt + 1, %method, %url, error = %err, "HTTP request failed");

                    if attempt + 1 < attempts && should_retry_error(&err) {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    return Err(InfraError::from(err).into());
                }
            }
        }

        Err(TaskflowError::Internal(
            "http client exhausted retries without producing a result".into(),
        ))
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = u32::try_from(retry_number.saturating_sub(1).min(8)).unwrap_or(8);
        self.base_backoff.saturating_mul(1u32 << shift)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl HttpTransport for HttpClient {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TaskflowError> {
        self.execute(&request).await
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    base_url: String,
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
    cookie_jar: Option<Arc<Jar>>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            base_url: taskflow_domain::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
            default_headers: None,
            cookie_jar: None,
        }
    }
}

impl HttpClientBuilder {
    /// Origin every request path is resolved against.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Share a cookie jar so server-set cookies survive across requests.
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// # Errors
    /// `TaskflowError::Config` for an unparsable base URL, or
    /// `TaskflowError::Internal` if the TLS backend cannot be initialized.
    pub fn build(self) -> Result<HttpClient, TaskflowError> {
        let base_url = Url::parse(&self.base_url).map_err(InfraError::from)?;
        if base_url.cannot_be_a_base() {
            return Err(TaskflowError::Config(format!("{base_url} cannot be used as a base URL")));
        }

        let mut headers = self.default_headers.unwrap_or_default();
        headers.entry(ACCEPT).or_insert(HeaderValue::from_static("application/json"));

        let mut builder =
            ReqwestClient::builder().timeout(self.timeout).no_proxy().default_headers(headers);

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(jar) = self.cookie_jar {
            builder = builder.cookie_provider(jar);
        }

        let client = builder.build().map_err(|err| {
            TaskflowError::Internal(format!("failed to build HTTP client: {err}"))
        })?;

        Ok(HttpClient {
            client,
            base_url,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

const fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Options => Method::OPTIONS,
    }
}

fn to_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, TaskflowError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TaskflowError::Validation(format!("invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TaskflowError::Validation(format!("invalid value for header '{name}': {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

async fn read_response(response: Response) -> Result<ApiResponse, TaskflowError> {
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response.bytes().await.map_err(InfraError::from)?;

    Ok(ApiResponse { status, headers, body: body.to_vec() })
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_request() || err.is_connect()
}
