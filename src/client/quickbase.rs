//! The `QuickBase` client
//!
//! Dispatches registry operations over the shared HTTP transport, picking
//! the credential per call and reviving dates in responses.

use super::pending::PendingCall;
use crate::auth::{extract_temp_token, Authenticator, APP_TOKEN_HEADER};
use crate::config::QuickBaseOptions;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig, RequestConfig};
use crate::ops::{Marshaled, Operation, ResponseKind};
use crate::value::QbValue;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use bytes::Bytes;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Content type for QBL request bodies
const QBL_CONTENT_TYPE: &str = "application/x-yaml";

/// Async client for the JSON REST API
///
/// Every operation in [`Operation::ALL`] is available as a snake_case
/// method returning a [`PendingCall`]:
///
/// ```rust,ignore
/// let qb = QuickBase::new(QuickBaseOptions::new("demo").user_token("b123_xyz"))?;
/// let app = qb.get_app(json!({ "appId": "bqxyz" })).await?;
/// let everything = qb.run_query(json!({ "from": "bqabc" })).all().await?;
/// ```
#[derive(Debug)]
pub struct QuickBase {
    options: QuickBaseOptions,
    http: HttpClient,
    auth: Authenticator,
}

impl QuickBase {
    /// Create a client
    ///
    /// Fails on invalid options or when the HTTP client cannot be built.
    pub fn new(options: QuickBaseOptions) -> Result<Self> {
        Self::build(options, None)
    }

    /// Create a client around an existing reqwest client
    pub fn with_client(options: QuickBaseOptions, client: Client) -> Result<Self> {
        Self::build(options, Some(client))
    }

    fn build(options: QuickBaseOptions, client: Option<Client>) -> Result<Self> {
        options.validate()?;

        let config = http_config(&options)?;
        let http = match client {
            Some(client) => HttpClient::with_client(config, client),
            None => HttpClient::with_config(config)?,
        };

        let mut auth = Authenticator::new(options.auth_config(), options.temp_token_lifespan())
            .with_debug(options.debug);
        if let (Some(dbid), Some(token)) = (&options.temp_token_dbid, &options.temp_token) {
            auth.seed_temp_token(dbid, token);
        }

        Ok(Self {
            options,
            http,
            auth,
        })
    }

    /// Options the client was built with
    pub fn options(&self) -> &QuickBaseOptions {
        &self.options
    }

    /// Underlying HTTP transport
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Credential handling and the temporary token cache
    pub fn authenticator(&self) -> &Authenticator {
        &self.auth
    }

    /// Prepare a call; await it for one page or use `pages()`/`all()`
    pub fn call(&self, operation: Operation, params: impl Into<QbValue>) -> PendingCall<'_> {
        PendingCall::new(self, operation, params.into())
    }

    /// Prepare a call by wire name (`runQuery`) or method name (`run_query`)
    pub fn call_by_name(&self, name: &str, params: impl Into<QbValue>) -> Result<PendingCall<'_>> {
        Ok(self.call(Operation::from_name(name)?, params))
    }

    /// Temporary token for a resource, from the cache or freshly fetched
    pub async fn temp_token(&self, dbid: &str) -> Result<String> {
        self.auth.temp_token(&self.http, dbid).await
    }

    /// Forget every cached temporary token
    pub async fn clear_temp_tokens(&self) {
        self.auth.clear_cache().await;
    }

    /// Download a file attachment and decode it
    pub async fn download_file_bytes(&self, params: impl Into<QbValue>) -> Result<Bytes> {
        let content = self.download_file(params).await?;
        let text = content
            .as_str()
            .ok_or_else(|| Error::decode("file download did not return text"))?;
        let bytes = BASE64_STANDARD
            .decode(text.trim())
            .map_err(|e| Error::decode(format!("file content is not base64: {e}")))?;
        Ok(Bytes::from(bytes))
    }

    /// Send one request for `operation`
    pub(crate) async fn execute(&self, operation: Operation, request: &Marshaled) -> Result<Value> {
        let def = operation.def();
        let url = self.http.endpoint(&request.segments)?;
        let is_temp_token_call = operation == Operation::GetTempTokenDbid;

        let mut config = RequestConfig {
            query: request.query.clone(),
            ..RequestConfig::default()
        };
        if let Some(body) = &request.body {
            config = config.json(body.clone());
        } else if let Some(text) = &request.text {
            config = config
                .text(text.clone())
                .header("Content-Type", QBL_CONTENT_TYPE);
        }
        if is_temp_token_call {
            if let Some(app_token) = &self.options.app_token {
                config = config.header(APP_TOKEN_HEADER, app_token.as_str());
            }
        }

        // The temp token endpoint authenticates with the user token itself
        let resource = if is_temp_token_call {
            None
        } else {
            request.resource.as_deref()
        };
        let config = self.auth.apply(&self.http, config, resource).await?;

        debug!("Executing {} ({} {})", def.name, def.method, url.path());

        let value = match def.response {
            ResponseKind::Json => self.http.request_json(def.method, url, config).await?,
            ResponseKind::Text => {
                Value::String(self.http.request_text(def.method, url, config).await?)
            }
        };

        if is_temp_token_call {
            if let (Some(dbid), Some(token)) = (request.segments.last(), extract_temp_token(&value))
            {
                self.auth.store_temp_token(dbid, &token).await;
            }
        }

        Ok(value)
    }

    /// Convert a raw response for the caller
    pub(crate) fn revive(&self, operation: Operation, value: Value) -> QbValue {
        match (operation.def().response, value) {
            (ResponseKind::Text, Value::String(text)) => QbValue::String(text),
            (_, value) => QbValue::from_json(value, self.options.convert_dates),
        }
    }
}

/// Transport settings derived from client options
fn http_config(options: &QuickBaseOptions) -> Result<HttpClientConfig> {
    HttpClientConfig::builder()
        .base_url(options.base_url())
        .realm_hostname(options.realm_hostname())
        .rate_limit(RateLimiterConfig::new(
            options.connection_limit,
            Duration::from_millis(options.connection_limit_period_ms),
        ))
        .error_on_rate_limit(options.error_on_connection_limit)
        .retry_on_quota_exceeded(options.retry_on_quota_exceeded)
        .user_agent(options.user_agent_string())
        .debug(options.debug)
        .build()
}
