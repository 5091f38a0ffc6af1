//! Port for caching rendered responses.
//!
//! Entries go `Empty -> Populated` on the first read, expire after their TTL
//! and are dropped wholesale by [`ResponseCache::clear`]. Writes elsewhere in
//! the system never evict entries.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CacheKey, CacheNamespace, define_port_error};

define_port_error! {
    /// Errors surfaced by response cache adapters.
    pub enum ResponseCacheError {
        /// Backend unreachable or timing out.
        Backend { message: String } => ServiceUnavailable: "response cache backend failure: {message}",
        /// Stored payload could not be encoded or decoded.
        Serialization { message: String } => InternalError: "response cache serialisation failed: {message}",
    }
}

/// A rendered response body and its content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedPage {
    /// `Content-Type` of the original response.
    pub content_type: Option<String>,
    /// Response body bytes.
    pub body: Vec<u8>,
}

/// Key/TTL store for rendered pages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Fetch a live entry.
    async fn get(&self, key: &CacheKey) -> Result<Option<CachedPage>, ResponseCacheError>;

    /// Store an entry that expires after `ttl`.
    async fn put(
        &self,
        key: &CacheKey,
        page: &CachedPage,
        ttl: Duration,
    ) -> Result<(), ResponseCacheError>;

    /// Drop every entry of `namespace`.
    async fn clear(&self, namespace: &CacheNamespace) -> Result<(), ResponseCacheError>;
}
