//! Per-resource temporary token cache

use super::types::CachedToken;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Maps a resource id to its most recent temporary token
///
/// Expiry is checked on read; stale entries stay in the map until they are
/// overwritten by the next `set` for the same resource.
#[derive(Debug)]
pub struct TokenCache {
    lifespan: Duration,
    entries: RwLock<HashMap<String, CachedToken>>,
}

impl TokenCache {
    /// Create an empty cache
    pub fn new(lifespan: Duration) -> Self {
        Self {
            lifespan,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Store a token before the cache is shared
    pub fn seed(&mut self, dbid: impl Into<String>, token: impl Into<String>) {
        self.entries
            .get_mut()
            .insert(dbid.into(), CachedToken::new(token));
    }

    /// Token lifespan
    pub fn lifespan(&self) -> Duration {
        self.lifespan
    }

    /// Token for a resource, if one was fetched within the lifespan
    pub async fn get(&self, dbid: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(dbid)
            .filter(|cached| cached.is_fresh(self.lifespan))
            .map(|cached| cached.token.clone())
    }

    /// Store a token fetched now
    pub async fn set(&self, dbid: impl Into<String>, token: impl Into<String>) {
        self.insert(dbid, CachedToken::new(token)).await;
    }

    /// Store a token with an explicit fetch time
    pub async fn insert(&self, dbid: impl Into<String>, token: CachedToken) {
        self.entries.write().await.insert(dbid.into(), token);
    }

    /// Raw entry for a resource, fresh or not
    pub async fn entry(&self, dbid: &str) -> Option<CachedToken> {
        self.entries.read().await.get(dbid).cloned()
    }

    /// Drop every cached token
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, including stale ones
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod cache_tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_get_missing() {
        let cache = TokenCache::new(Duration::from_secs(290));
        assert_eq!(cache.get("bqxyz").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = TokenCache::new(Duration::from_secs(290));
        cache.set("bqxyz", "tok-1").await;
        assert_eq!(cache.get("bqxyz").await.as_deref(), Some("tok-1"));
        assert_eq!(cache.get("bqxyz").await.as_deref(), Some("tok-1"));
        assert_eq!(cache.get("other").await, None);
    }

    #[tokio::test]
    async fn test_stale_entry_reads_as_absent() {
        let cache = TokenCache::new(Duration::from_secs(290));
        let old = CachedToken::fetched_at("tok-old", Utc::now() - chrono::Duration::seconds(291));
        cache.insert("bqxyz", old).await;

        assert_eq!(cache.get("bqxyz").await, None);
        // Still stored until overwritten
        assert_eq!(cache.len().await, 1);

        cache.set("bqxyz", "tok-new").await;
        assert_eq!(cache.get("bqxyz").await.as_deref(), Some("tok-new"));
    }

    #[tokio::test]
    async fn test_set_overwrites_timestamp() {
        let cache = TokenCache::new(Duration::from_secs(290));
        let old = CachedToken::fetched_at("tok", Utc::now() - chrono::Duration::seconds(100));
        cache.insert("bqxyz", old.clone()).await;
        cache.set("bqxyz", "tok").await;

        let entry = cache.entry("bqxyz").await.unwrap();
        assert!(entry.fetched_at > old.fetched_at);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = TokenCache::new(Duration::from_secs(290));
        cache.set("a", "1").await;
        cache.set("b", "2").await;
        assert_eq!(cache.len().await, 2);
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[test]
    fn test_seed_before_sharing() {
        let mut cache = TokenCache::new(Duration::from_secs(290));
        cache.seed("bqxyz", "seeded");

        let token = tokio_test::block_on(cache.get("bqxyz"));
        assert_eq!(token.as_deref(), Some("seeded"));
    }
}
