//! HTTP transport with connection limiting and quota handling
//!
//! Provides the HTTP client both API surfaces share. It handles:
//! - Realm and user agent headers
//! - Connection limiting to stay under the platform's request quota
//! - Waiting out 429 responses when quota retries are enabled
//! - Mapping error bodies (`{ message, description }`) to `Error::Api`

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use crate::types::Method;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Header naming the realm a request targets
pub const REALM_HEADER: &str = "QB-Realm-Hostname";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL all endpoint paths are appended to
    pub base_url: Url,
    /// Realm hostname sent with every request
    pub realm_hostname: Option<String>,
    /// Default timeout, `None` leaves reqwest's default
    pub timeout: Option<Duration>,
    /// Connection limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Fail instead of waiting when the limiter is exhausted
    pub error_on_rate_limit: bool,
    /// Wait and retry on HTTP 429
    pub retry_on_quota_exceeded: bool,
    /// Maximum number of 429 retries per request
    pub max_quota_retries: u32,
    /// Longest single wait for a quota reset
    pub max_quota_wait: Duration,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
    /// Log request summaries at info level
    pub debug: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://api.quickbase.com/v1/").expect("static URL is valid"),
            realm_hostname: None,
            timeout: None,
            rate_limit: Some(RateLimiterConfig::default()),
            error_on_rate_limit: false,
            retry_on_quota_exceeded: true,
            max_quota_retries: 3,
            max_quota_wait: Duration::from_secs(60),
            default_headers: HashMap::new(),
            user_agent: format!("quickbase-sdk/{}", env!("CARGO_PKG_VERSION")),
            debug: false,
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
    base_url: Option<String>,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the realm hostname header
    pub fn realm_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.config.realm_hostname = Some(hostname.into());
        self
    }

    /// Set the default request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Fail with `Error::ConnectionLimit` instead of waiting
    pub fn error_on_rate_limit(mut self, enabled: bool) -> Self {
        self.config.error_on_rate_limit = enabled;
        self
    }

    /// Wait and retry on HTTP 429
    pub fn retry_on_quota_exceeded(mut self, enabled: bool) -> Self {
        self.config.retry_on_quota_exceeded = enabled;
        self
    }

    /// Configure 429 handling
    pub fn quota_retries(mut self, enabled: bool, max_retries: u32, max_wait: Duration) -> Self {
        self.config.retry_on_quota_exceeded = enabled;
        self.config.max_quota_retries = max_retries;
        self.config.max_quota_wait = max_wait;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Log request summaries at info level
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    /// Build the config
    pub fn build(self) -> Result<HttpClientConfig> {
        let mut config = self.config;
        if let Some(base) = self.base_url {
            let base = if base.ends_with('/') {
                base
            } else {
                format!("{base}/")
            };
            config.base_url = Url::parse(&base)?;
        }
        Ok(config)
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters, in send order
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
    /// Raw request body, sent as-is
    pub text_body: Option<String>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a raw body
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text_body = Some(body.into());
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Value of a query parameter
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Error body returned by the JSON API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// HTTP client with connection limiting and quota retries
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    ///
    /// Fails when the TLS backend cannot be initialized.
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(config, client))
    }

    /// Create a client around an existing reqwest client
    pub fn with_client(config: HttpClientConfig, client: Client) -> Self {
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);
        Self {
            client,
            config,
            rate_limiter,
        }
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Build the URL for a list of path segments under the base URL
    ///
    /// Segments are percent-encoded; an empty segment is kept as-is so a
    /// missing identifier still reaches the server.
    pub fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url> {
        let mut url = self.config.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| Error::config("Base URL cannot hold a path"))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// Make a request and parse the JSON response
    pub async fn request_json(
        &self,
        method: Method,
        url: Url,
        config: RequestConfig,
    ) -> Result<Value> {
        let response = self.request(method, url, config).await?;
        let text = response.text().await.map_err(Error::Http)?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| Error::decode(format!("Response is not valid JSON: {e}")))
    }

    /// Make a request and return the response body as text
    pub async fn request_text(
        &self,
        method: Method,
        url: Url,
        config: RequestConfig,
    ) -> Result<String> {
        let response = self.request(method, url, config).await?;
        response.text().await.map_err(Error::Http)
    }

    /// Make a generic request
    ///
    /// Non-2xx responses are returned as errors. Only 429 is retried, and only
    /// when quota retries are enabled.
    pub async fn request(
        &self,
        method: Method,
        url: Url,
        config: RequestConfig,
    ) -> Result<Response> {
        let timeout = config.timeout.or(self.config.timeout);
        let mut attempt = 0;

        loop {
            self.acquire().await?;

            let mut req = self
                .client
                .request(method.into(), url.clone())
                .header(reqwest::header::USER_AGENT, self.config.user_agent.as_str());

            if let Some(ref realm) = self.config.realm_hostname {
                req = req.header(REALM_HEADER, realm.as_str());
            }

            // Add default headers
            for (key, value) in &self.config.default_headers {
                req = req.header(key.as_str(), value.as_str());
            }

            // Add request-specific headers
            for (key, value) in &config.headers {
                req = req.header(key.as_str(), value.as_str());
            }

            if !config.query.is_empty() {
                req = req.query(&config.query);
            }

            if let Some(ref body) = config.body {
                req = req.json(body);
            } else if let Some(ref body) = config.text_body {
                req = req.body(body.clone());
            }

            if let Some(timeout) = timeout {
                req = req.timeout(timeout);
            }

            if self.config.debug {
                info!(%method, %url, body = ?config.body, "QuickBase request");
            } else {
                debug!("Request: {} {}", method, url);
            }

            let response = match req.send().await {
                Ok(response) => response,
                Err(e) if e.is_timeout() => {
                    return Err(Error::Timeout {
                        timeout_ms: timeout.map_or(0, |t| t.as_millis() as u64),
                    });
                }
                Err(e) => return Err(Error::Http(e)),
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = quota_wait(&response).min(self.config.max_quota_wait);
                if self.config.retry_on_quota_exceeded && attempt < self.config.max_quota_retries
                {
                    warn!(
                        "Quota exceeded (429), attempt {}/{}, waiting {:?}",
                        attempt + 1,
                        self.config.max_quota_retries + 1,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                    continue;
                }
                return Err(Error::RateLimited {
                    retry_after_seconds: wait.as_secs().max(1),
                });
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let err = api_error(status, &body);
                debug!("Request failed: {} {} -> {}", method, url, err);
                return Err(err);
            }

            debug!("Request succeeded: {} {} -> {}", method, url, status.as_u16());
            return Ok(response);
        }
    }

    /// Wait for (or fail on) the connection limiter
    async fn acquire(&self) -> Result<()> {
        let Some(ref limiter) = self.rate_limiter else {
            return Ok(());
        };

        if self.config.error_on_rate_limit {
            if limiter.try_acquire() {
                return Ok(());
            }
            let (limit, period) = self
                .config
                .rate_limit
                .as_ref()
                .map_or((0, Duration::ZERO), |c| (c.limit, c.period));
            return Err(Error::ConnectionLimit {
                limit,
                period_ms: period.as_millis() as u64,
            });
        }

        limiter.wait().await;
        Ok(())
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Build an `Error::Api` from a non-2xx response body
fn api_error(status: StatusCode, body: &str) -> Error {
    let fallback = status.canonical_reason().unwrap_or("Request failed").to_string();

    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => Error::api(
            status.as_u16(),
            parsed.message.unwrap_or(fallback),
            parsed.description,
        ),
        Err(_) => {
            let body = body.trim();
            let description = (!body.is_empty()).then(|| body.to_string());
            Error::api(status.as_u16(), fallback, description)
        }
    }
}

/// How long to wait before retrying a 429
///
/// `Retry-After` is in seconds; `x-ratelimit-reset` is milliseconds until reset.
fn quota_wait(response: &Response) -> Duration {
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
    };

    if let Some(secs) = header("retry-after") {
        return Duration::from_secs(secs);
    }
    if let Some(ms) = header("x-ratelimit-reset") {
        return Duration::from_millis(ms);
    }
    Duration::from_secs(1)
}
