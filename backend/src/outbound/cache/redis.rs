//! Redis-backed response cache.
//!
//! Pages are stored as JSON under their [`CacheKey`] with `SET .. EX`.
//! Clearing a namespace walks its keys with `SCAN MATCH` so large keyspaces
//! never block the server the way `KEYS` would.
//!
//! The pool is built without a connection check and gives up on a checkout
//! quickly, so an unreachable Redis degrades to live rendering instead of
//! stalling start-up or requests.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};
use bb8_redis::redis::{self, RedisError};
use thiserror::Error;
use tracing::debug;

use crate::domain::ports::{CacheKey, CacheNamespace, CachedPage, ResponseCache, ResponseCacheError};

const SCAN_BATCH: usize = 200;
/// Longest a request waits for a pooled connection.
const CONNECTION_TIMEOUT: Duration = Duration::from_millis(250);

/// Failures while setting up the Redis pool.
#[derive(Debug, Error)]
pub enum RedisResponseCacheError {
    /// The connection URL was rejected.
    #[error("invalid redis url: {0}")]
    InvalidUrl(#[source] RedisError),
}

/// [`ResponseCache`] over a `bb8` pool of Redis connections.
#[derive(Clone)]
pub struct RedisResponseCache {
    pool: Pool<RedisConnectionManager>,
}

impl RedisResponseCache {
    /// Build a pool for `url`. Connections are opened on first use.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn connect(url: &str) -> Result<Self, RedisResponseCacheError> {
        let manager =
            RedisConnectionManager::new(url).map_err(RedisResponseCacheError::InvalidUrl)?;
        let pool = Pool::builder()
            .connection_timeout(CONNECTION_TIMEOUT)
            .build_unchecked(manager);
        Ok(Self { pool })
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, ResponseCacheError> {
        self.pool
            .get()
            .await
            .map_err(|err| ResponseCacheError::backend(err.to_string()))
    }
}

fn backend(err: RedisError) -> ResponseCacheError {
    ResponseCacheError::backend(err.to_string())
}

#[async_trait]
impl ResponseCache for RedisResponseCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CachedPage>, ResponseCacheError> {
        let mut conn = self.connection().await?;
        let raw: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key.as_str())
            .query_async(&mut *conn)
            .await
            .map_err(backend)?;
        raw.map(|bytes| {
            serde_json::from_slice(&bytes)
                .map_err(|err| ResponseCacheError::serialization(err.to_string()))
        })
        .transpose()
    }

    async fn put(
        &self,
        key: &CacheKey,
        page: &CachedPage,
        ttl: Duration,
    ) -> Result<(), ResponseCacheError> {
        let payload = serde_json::to_vec(page)
            .map_err(|err| ResponseCacheError::serialization(err.to_string()))?;
        // EX rejects zero.
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.connection().await?;
        let (): () = redis::cmd("SET")
            .arg(key.as_str())
            .arg(payload)
            .arg("EX")
            .arg(seconds)
            .query_async(&mut *conn)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn clear(&self, namespace: &CacheNamespace) -> Result<(), ResponseCacheError> {
        let pattern = namespace.pattern();
        let mut conn = self.connection().await?;
        let mut cursor: u64 = 0;
        let mut removed: usize = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut *conn)
                .await
                .map_err(backend)?;
            if !keys.is_empty() {
                let deleted: usize = redis::cmd("DEL")
                    .arg(&keys)
                    .query_async(&mut *conn)
                    .await
                    .map_err(backend)?;
                removed = removed.saturating_add(deleted);
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        debug!(namespace = namespace.as_str(), removed, "cleared cached pages");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn malformed_urls_are_rejected() {
        let err = RedisResponseCache::connect("not a redis url")
            .err()
            .expect("url rejected");
        assert!(matches!(err, RedisResponseCacheError::InvalidUrl(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn unreachable_redis_fails_fast() {
        // Port 1 is reserved and nothing listens there.
        let cache = RedisResponseCache::connect("redis://127.0.0.1:1").expect("pool builds");
        let key = CacheNamespace::new("index_page")
            .expect("valid namespace")
            .key_for("/api/v1/posts");

        let outcome = tokio::time::timeout(Duration::from_secs(5), cache.get(&key))
            .await
            .expect("checkout gives up before the outer timeout");
        assert!(outcome.is_err());
    }
}
