//! HTTP client module
//!
//! Provides the transport shared by the JSON and XML clients.
//!
//! # Features
//!
//! - **Realm Headers**: `QB-Realm-Hostname` and user agent on every request
//! - **Connection Limit**: Token bucket rate limiter using governor
//! - **Quota Retries**: Waits out HTTP 429 responses when enabled
//! - **Error Mapping**: Non-2xx responses become `Error::Api` with the server message

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
