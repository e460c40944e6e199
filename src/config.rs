//! Client configuration
//!
//! `QuickBaseOptions` is the single configuration surface for both the JSON
//! and the legacy XML clients. It deserializes from YAML (every field has a
//! default except `realm`) and can be assembled from environment variables.

use crate::auth::AuthConfig;
use crate::error::{Error, Result, ResultExt};
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default API host
pub const DEFAULT_SERVER: &str = "api.quickbase.com";

/// Default API version
pub const DEFAULT_VERSION: u32 = 1;

/// Temporary tokens expire server-side after five minutes
pub const DEFAULT_TEMP_TOKEN_LIFESPAN_MS: u64 = 290_000;

/// Default connection limit per period
pub const DEFAULT_CONNECTION_LIMIT: u32 = 10;

/// Default connection limit period
pub const DEFAULT_CONNECTION_LIMIT_PERIOD_MS: u64 = 1_000;

/// Default timeout for legacy XML requests
pub const DEFAULT_XML_TIMEOUT_MS: u64 = 60_000;

/// Options shared by [`crate::QuickBase`] and [`crate::xml::XmlClient`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickBaseOptions {
    /// API host, without scheme
    #[serde(default = "default_server")]
    pub server: String,

    /// API version (the `v1` in `/v1/apps`)
    #[serde(default = "default_version")]
    pub version: u32,

    /// Realm name, e.g. `example` for `example.quickbase.com`
    #[serde(default)]
    pub realm: String,

    /// Long-lived user token
    #[serde(default)]
    pub user_token: Option<String>,

    /// Pre-fetched temporary token
    #[serde(default)]
    pub temp_token: Option<String>,

    /// Resource the pre-fetched temporary token is scoped to
    #[serde(default)]
    pub temp_token_dbid: Option<String>,

    /// Authorize resource-scoped calls with per-resource temporary tokens
    #[serde(default)]
    pub use_temp_tokens: bool,

    /// Application token, sent with temporary token requests and XML calls
    #[serde(default)]
    pub app_token: Option<String>,

    /// OAuth bearer token
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// User agent suffix
    #[serde(default)]
    pub user_agent: Option<String>,

    /// How long a temporary token is reused before refetching
    #[serde(default = "default_temp_token_lifespan_ms")]
    pub temp_token_lifespan_ms: u64,

    /// Convert ISO-8601 strings in responses to date-time values
    #[serde(default = "default_true")]
    pub convert_dates: bool,

    /// Maximum requests per connection limit period
    #[serde(default = "default_connection_limit")]
    pub connection_limit: u32,

    /// Connection limit period
    #[serde(default = "default_connection_limit_period_ms")]
    pub connection_limit_period_ms: u64,

    /// Fail instead of waiting when the connection limit is reached
    #[serde(default)]
    pub error_on_connection_limit: bool,

    /// Wait and retry when the server answers 429
    #[serde(default = "default_true")]
    pub retry_on_quota_exceeded: bool,

    /// Log request and response summaries
    #[serde(default)]
    pub debug: bool,

    /// Timeout for legacy XML requests
    #[serde(default = "default_xml_timeout_ms")]
    pub xml_timeout_ms: u64,

    /// Reject legacy XML write actions before they are sent
    #[serde(default)]
    pub read_only: bool,
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

fn default_version() -> u32 {
    DEFAULT_VERSION
}

fn default_temp_token_lifespan_ms() -> u64 {
    DEFAULT_TEMP_TOKEN_LIFESPAN_MS
}

fn default_true() -> bool {
    true
}

fn default_connection_limit() -> u32 {
    DEFAULT_CONNECTION_LIMIT
}

fn default_connection_limit_period_ms() -> u64 {
    DEFAULT_CONNECTION_LIMIT_PERIOD_MS
}

fn default_xml_timeout_ms() -> u64 {
    DEFAULT_XML_TIMEOUT_MS
}

impl Default for QuickBaseOptions {
    fn default() -> Self {
        Self {
            server: default_server(),
            version: DEFAULT_VERSION,
            realm: String::new(),
            user_token: None,
            temp_token: None,
            temp_token_dbid: None,
            use_temp_tokens: false,
            app_token: None,
            bearer_token: None,
            user_agent: None,
            temp_token_lifespan_ms: DEFAULT_TEMP_TOKEN_LIFESPAN_MS,
            convert_dates: true,
            connection_limit: DEFAULT_CONNECTION_LIMIT,
            connection_limit_period_ms: DEFAULT_CONNECTION_LIMIT_PERIOD_MS,
            error_on_connection_limit: false,
            retry_on_quota_exceeded: true,
            debug: false,
            xml_timeout_ms: DEFAULT_XML_TIMEOUT_MS,
            read_only: false,
        }
    }
}

impl QuickBaseOptions {
    /// Options for a realm with everything else defaulted
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            ..Default::default()
        }
    }

    /// Set the user token
    #[must_use]
    pub fn user_token(mut self, token: impl Into<String>) -> Self {
        self.user_token = Some(token.into());
        self
    }

    /// Seed a temporary token for one resource
    #[must_use]
    pub fn temp_token(mut self, dbid: impl Into<String>, token: impl Into<String>) -> Self {
        self.temp_token_dbid = Some(dbid.into());
        self.temp_token = Some(token.into());
        self.use_temp_tokens = true;
        self
    }

    /// Enable or disable per-resource temporary tokens
    #[must_use]
    pub fn use_temp_tokens(mut self, enabled: bool) -> Self {
        self.use_temp_tokens = enabled;
        self
    }

    /// Set the application token
    #[must_use]
    pub fn app_token(mut self, token: impl Into<String>) -> Self {
        self.app_token = Some(token.into());
        self
    }

    /// Set an OAuth bearer token
    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Override the API host (tests point this at a mock server)
    #[must_use]
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// Toggle response date conversion
    #[must_use]
    pub fn convert_dates(mut self, enabled: bool) -> Self {
        self.convert_dates = enabled;
        self
    }

    /// Override the temporary token lifespan
    #[must_use]
    pub fn with_temp_token_lifespan(mut self, lifespan: Duration) -> Self {
        self.temp_token_lifespan_ms = lifespan.as_millis() as u64;
        self
    }

    /// Put the XML client in read-only mode
    #[must_use]
    pub fn read_only(mut self, enabled: bool) -> Self {
        self.read_only = enabled;
        self
    }

    /// Toggle debug logging
    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Parse options from a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Self = serde_yaml::from_str(yaml)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    /// Build options from `QB_*` environment variables
    ///
    /// Reads `QB_REALM` (required), `QB_USER_TOKEN`, `QB_APP_TOKEN`,
    /// `QB_SERVER` and `QB_USE_TEMP_TOKENS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let realm = lookup("QB_REALM")
            .none_if_empty()
            .ok_or_else(|| Error::missing_field("QB_REALM"))?;

        let mut options = Self::new(realm);
        options.user_token = lookup("QB_USER_TOKEN").none_if_empty();
        options.app_token = lookup("QB_APP_TOKEN").none_if_empty();
        if let Some(server) = lookup("QB_SERVER").none_if_empty() {
            options.server = server;
        }
        if let Some(flag) = lookup("QB_USE_TEMP_TOKENS").none_if_empty() {
            options.use_temp_tokens = parse_flag("QB_USE_TEMP_TOKENS", &flag)?;
        }
        options.validate()?;
        Ok(options)
    }

    /// Check field combinations that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.realm.is_empty() {
            return Err(Error::missing_field("realm"));
        }
        if self.version == 0 {
            return Err(Error::InvalidConfigValue {
                field: "version".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.connection_limit == 0 {
            return Err(Error::InvalidConfigValue {
                field: "connectionLimit".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.temp_token.is_some() && self.temp_token_dbid.is_none() {
            return Err(Error::missing_field("tempTokenDbid"));
        }
        Ok(())
    }

    /// `QB-Realm-Hostname` header value
    pub fn realm_hostname(&self) -> String {
        format!("{}.quickbase.com", self.realm)
    }

    /// Base URL of the JSON API, with trailing slash
    pub fn base_url(&self) -> String {
        let server = self.server.trim_end_matches('/');
        if server.starts_with("http://") || server.starts_with("https://") {
            format!("{server}/v{}/", self.version)
        } else {
            format!("https://{server}/v{}/", self.version)
        }
    }

    /// Full user agent string
    pub fn user_agent_string(&self) -> String {
        let base = format!("quickbase-sdk/{}", env!("CARGO_PKG_VERSION"));
        match &self.user_agent {
            Some(extra) if !extra.is_empty() => format!("{base} {extra}"),
            _ => base,
        }
    }

    /// Temporary token lifespan
    pub fn temp_token_lifespan(&self) -> Duration {
        Duration::from_millis(self.temp_token_lifespan_ms)
    }

    /// Legacy XML request timeout
    pub fn xml_timeout(&self) -> Duration {
        Duration::from_millis(self.xml_timeout_ms)
    }

    /// Credential mode selected by these options
    ///
    /// A seeded temporary token implies temporary token mode.
    pub fn auth_config(&self) -> AuthConfig {
        if self.use_temp_tokens || self.temp_token.is_some() {
            return AuthConfig::TempTokens {
                user_token: self.user_token.clone(),
                app_token: self.app_token.clone(),
            };
        }
        if let Some(token) = &self.user_token {
            return AuthConfig::UserToken {
                token: token.clone(),
            };
        }
        if let Some(token) = &self.bearer_token {
            return AuthConfig::Bearer {
                token: token.clone(),
            };
        }
        AuthConfig::None
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::InvalidConfigValue {
            field: field.to_string(),
            message: format!("expected a boolean, got '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = QuickBaseOptions::new("demo");
        assert_eq!(options.server, "api.quickbase.com");
        assert_eq!(options.version, 1);
        assert_eq!(options.temp_token_lifespan(), Duration::from_secs(290));
        assert!(options.convert_dates);
        assert!(options.retry_on_quota_exceeded);
        assert!(!options.use_temp_tokens);
        assert_eq!(options.connection_limit, 10);
        assert_eq!(options.xml_timeout(), Duration::from_secs(60));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_base_url_and_realm() {
        let options = QuickBaseOptions::new("demo");
        assert_eq!(options.base_url(), "https://api.quickbase.com/v1/");
        assert_eq!(options.realm_hostname(), "demo.quickbase.com");

        let local = QuickBaseOptions::new("demo").server("http://127.0.0.1:9000/");
        assert_eq!(local.base_url(), "http://127.0.0.1:9000/v1/");
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r"
realm: demo
userToken: b12345_abcd
convertDates: false
tempTokenLifespanMs: 1000
connectionLimit: 5
";
        let options = QuickBaseOptions::from_yaml_str(yaml).unwrap();
        assert_eq!(options.realm, "demo");
        assert_eq!(options.user_token.as_deref(), Some("b12345_abcd"));
        assert!(!options.convert_dates);
        assert_eq!(options.temp_token_lifespan_ms, 1000);
        assert_eq!(options.connection_limit, 5);
        assert_eq!(options.server, DEFAULT_SERVER);
    }

    #[test]
    fn test_from_yaml_requires_realm() {
        let err = QuickBaseOptions::from_yaml_str("userToken: abc").unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "realm"));
    }

    #[test]
    fn test_temp_token_requires_dbid() {
        let yaml = "realm: demo\ntempToken: abc\n";
        let err = QuickBaseOptions::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "tempTokenDbid"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "realm: filerealm\nreadOnly: true").unwrap();

        let options = QuickBaseOptions::from_file(file.path()).unwrap();
        assert_eq!(options.realm, "filerealm");
        assert!(options.read_only);

        let missing = QuickBaseOptions::from_file("/nonexistent/quickbase.yaml");
        assert!(matches!(missing, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("QB_REALM", "envrealm"),
            ("QB_USER_TOKEN", "tok"),
            ("QB_USE_TEMP_TOKENS", "yes"),
        ]
        .into_iter()
        .collect();

        let options =
            QuickBaseOptions::from_lookup(|k| env.get(k).map(|v| (*v).to_string())).unwrap();
        assert_eq!(options.realm, "envrealm");
        assert_eq!(options.user_token.as_deref(), Some("tok"));
        assert!(options.use_temp_tokens);

        let err = QuickBaseOptions::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { .. }));
    }

    #[test]
    fn test_auth_config_selection() {
        let none = QuickBaseOptions::new("demo");
        assert!(matches!(none.auth_config(), AuthConfig::None));

        let user = QuickBaseOptions::new("demo").user_token("u");
        assert!(matches!(user.auth_config(), AuthConfig::UserToken { .. }));

        let temp = QuickBaseOptions::new("demo")
            .user_token("u")
            .use_temp_tokens(true);
        assert!(matches!(temp.auth_config(), AuthConfig::TempTokens { .. }));

        let bearer = QuickBaseOptions::new("demo").bearer_token("b");
        assert!(matches!(bearer.auth_config(), AuthConfig::Bearer { .. }));
    }

    #[test]
    fn test_user_agent() {
        let mut options = QuickBaseOptions::new("demo");
        assert!(options.user_agent_string().starts_with("quickbase-sdk/"));
        options.user_agent = Some("my-app/2.0".to_string());
        assert!(options.user_agent_string().ends_with(" my-app/2.0"));
    }
}
