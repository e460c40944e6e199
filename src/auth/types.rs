//! Auth configuration types

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Authentication configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// No authentication header
    #[default]
    None,

    /// `Authorization: QB-USER-TOKEN <token>`
    UserToken {
        /// The user token
        token: String,
    },

    /// `Authorization: QB-TEMP-TOKEN <token>`, fetched per resource
    TempTokens {
        /// User token used to request temporary tokens
        user_token: Option<String>,
        /// Application token sent with temporary token requests
        app_token: Option<String>,
    },

    /// `Authorization: Bearer <token>`
    Bearer {
        /// The bearer token
        token: String,
    },
}

impl AuthConfig {
    /// Whether resource-scoped calls use temporary tokens
    pub fn uses_temp_tokens(&self) -> bool {
        matches!(self, Self::TempTokens { .. })
    }

    /// Header value for calls that are not resource-scoped
    pub fn static_header(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::UserToken { token } => Some(user_token_header(token)),
            Self::TempTokens { user_token, .. } => user_token.as_deref().map(user_token_header),
            Self::Bearer { token } => Some(format!("Bearer {token}")),
        }
    }
}

pub(crate) fn user_token_header(token: &str) -> String {
    format!("QB-USER-TOKEN {token}")
}

pub(crate) fn temp_token_header(token: &str) -> String {
    format!("QB-TEMP-TOKEN {token}")
}

/// Cached temporary token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    /// The temporary token
    pub token: String,
    /// When the token was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedToken {
    /// A token fetched now
    pub fn new(token: impl Into<String>) -> Self {
        Self::fetched_at(token, Utc::now())
    }

    /// A token fetched at a specific time
    pub fn fetched_at(token: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            fetched_at,
        }
    }

    /// Check whether the token is still inside its lifespan
    pub fn is_fresh(&self, lifespan: Duration) -> bool {
        let lifespan = chrono::Duration::from_std(lifespan).unwrap_or(chrono::Duration::MAX);
        Utc::now() - self.fetched_at < lifespan
    }
}
