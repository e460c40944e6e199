//! Authentication module
//!
//! Supports: user tokens, per-resource temporary tokens, bearer tokens
//!
//! The `Authenticator` selects the `Authorization` header for each request
//! and manages the temporary token cache for resource-scoped calls.

mod authenticator;
mod cache;
mod types;

pub use authenticator::{Authenticator, APP_TOKEN_HEADER};
pub(crate) use authenticator::extract_temp_token;
pub use cache::TokenCache;
pub use types::{AuthConfig, CachedToken};
