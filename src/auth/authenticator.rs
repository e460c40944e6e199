//! Authenticator implementation
//!
//! Picks the `Authorization` header for a request and fetches temporary
//! tokens for resource-scoped calls.

use super::cache::TokenCache;
use super::types::{temp_token_header, user_token_header, AuthConfig};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::types::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Header carrying the application token
pub const APP_TOKEN_HEADER: &str = "QB-App-Token";

/// Authenticator handles applying authentication to HTTP requests
#[derive(Debug)]
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Temporary tokens per resource
    cache: TokenCache,
    /// One lock per resource so concurrent misses for it issue one request
    refresh: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Log token fetches at info level
    debug: bool,
}

impl Authenticator {
    /// Create a new authenticator
    pub fn new(config: AuthConfig, lifespan: Duration) -> Self {
        Self {
            config,
            cache: TokenCache::new(lifespan),
            refresh: Mutex::new(HashMap::new()),
            debug: false,
        }
    }

    /// Log token fetches at info level
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Temporary token cache
    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Apply authentication to a request
    ///
    /// With temporary tokens enabled and a resource id present, the cached
    /// token for that resource is used (fetched on a miss). Otherwise the
    /// static credential, if any, is sent.
    pub async fn apply(
        &self,
        http: &HttpClient,
        config: RequestConfig,
        resource: Option<&str>,
    ) -> Result<RequestConfig> {
        let header = match (&self.config, resource) {
            (AuthConfig::TempTokens { .. }, Some(dbid)) if !dbid.is_empty() => {
                let token = self.temp_token(http, dbid).await?;
                Some(temp_token_header(&token))
            }
            _ => self.config.static_header(),
        };

        Ok(match header {
            Some(value) => config.header("Authorization", value),
            None => config,
        })
    }

    /// Get a valid temporary token for a resource, fetching if necessary
    pub async fn temp_token(&self, http: &HttpClient, dbid: &str) -> Result<String> {
        if let Some(token) = self.cache.get(dbid).await {
            return Ok(token);
        }

        let lock = self.refresh_lock(dbid).await;
        let _guard = lock.lock().await;

        // Another task may have fetched while we waited
        if let Some(token) = self.cache.get(dbid).await {
            return Ok(token);
        }

        let token = self.fetch_temp_token(http, dbid).await?;
        self.cache.set(dbid, token.clone()).await;
        Ok(token)
    }

    /// Fetch lock for one resource; other resources never wait on it
    async fn refresh_lock(&self, dbid: &str) -> Arc<Mutex<()>> {
        let mut locks = self.refresh.lock().await;
        Arc::clone(locks.entry(dbid.to_string()).or_default())
    }

    /// Request a new temporary token from `/auth/temporary/{dbid}`
    async fn fetch_temp_token(&self, http: &HttpClient, dbid: &str) -> Result<String> {
        if self.debug {
            info!(dbid, "Fetching temporary token");
        } else {
            debug!("Fetching temporary token for {}", dbid);
        }

        let mut request = RequestConfig::new();
        if let AuthConfig::TempTokens {
            user_token,
            app_token,
        } = &self.config
        {
            if let Some(token) = user_token {
                request = request.header("Authorization", user_token_header(token));
            }
            if let Some(token) = app_token {
                request = request.header(APP_TOKEN_HEADER, token.as_str());
            }
        } else if let Some(header) = self.config.static_header() {
            request = request.header("Authorization", header);
        }

        let url = http.endpoint(&["auth", "temporary", dbid])?;
        let body = http.request_json(Method::GET, url, request).await?;

        extract_temp_token(&body)
            .ok_or_else(|| Error::temp_token(dbid, "response has no temporaryAuthorization"))
    }

    /// Seed a pre-fetched token at construction
    pub fn seed_temp_token(&mut self, dbid: &str, token: &str) {
        self.cache.seed(dbid, token);
    }

    /// Store a token obtained elsewhere (explicit fetch)
    pub async fn store_temp_token(&self, dbid: &str, token: &str) {
        self.cache.set(dbid, token).await;
    }

    /// Clear the cached tokens (forces refetch)
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

/// Pull `temporaryAuthorization` out of a temp token response
pub(crate) fn extract_temp_token(body: &Value) -> Option<String> {
    body.get("temporaryAuthorization")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
