//! Response cache adapters.
//!
//! - [`NoopResponseCache`]: always misses, used when caching is disabled.
//! - [`InMemoryResponseCache`]: process-local TTL map for single instances
//!   and tests.
//! - [`RedisResponseCache`]: shared cache over `bb8-redis`.

mod memory;
mod redis;

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::{CacheKey, CacheNamespace, CachedPage, ResponseCache, ResponseCacheError};

pub use self::memory::InMemoryResponseCache;
pub use self::redis::{RedisResponseCache, RedisResponseCacheError};

/// Cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResponseCache;

impl NoopResponseCache {
    /// Create the cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResponseCache for NoopResponseCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<CachedPage>, ResponseCacheError> {
        Ok(None)
    }

    async fn put(
        &self,
        _key: &CacheKey,
        _page: &CachedPage,
        _ttl: Duration,
    ) -> Result<(), ResponseCacheError> {
        Ok(())
    }

    async fn clear(&self, _namespace: &CacheNamespace) -> Result<(), ResponseCacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn noop_cache_never_hits() {
        let cache = NoopResponseCache::new();
        let namespace = CacheNamespace::new("index_page").expect("valid namespace");
        let key = namespace.key_for("/api/v1/posts");
        let page = CachedPage {
            content_type: None,
            body: b"[]".to_vec(),
        };

        cache
            .put(&key, &page, Duration::from_secs(20))
            .await
            .expect("put accepted");
        assert!(cache.get(&key).await.expect("get succeeds").is_none());
        cache.clear(&namespace).await.expect("clear succeeds");
    }
}
