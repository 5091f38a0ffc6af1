//! Process-local response cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{CacheKey, CacheNamespace, CachedPage, ResponseCache, ResponseCacheError};

struct Entry {
    page: CachedPage,
    expires_at: DateTime<Utc>,
}

/// TTL map keyed by [`CacheKey`]; expiry is judged against the injected clock.
///
/// Every write sweeps out expired entries, so keys that are never read again
/// do not accumulate.
#[derive(Clone)]
pub struct InMemoryResponseCache {
    entries: Arc<Mutex<HashMap<CacheKey, Entry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryResponseCache {
    /// Create an empty cache.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<CacheKey, Entry>>, ResponseCacheError> {
        self.entries
            .lock()
            .map_err(|_| ResponseCacheError::backend("cache mutex poisoned"))
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CachedPage>, ResponseCacheError> {
        let now = self.clock.utc();
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.page.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        key: &CacheKey,
        page: &CachedPage,
        ttl: Duration,
    ) -> Result<(), ResponseCacheError> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|err| ResponseCacheError::backend(format!("ttl out of range: {err}")))?;
        let now = self.clock.utc();
        let mut entries = self.lock()?;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.clone(),
            Entry {
                page: page.clone(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn clear(&self, namespace: &CacheNamespace) -> Result<(), ResponseCacheError> {
        self.lock()?.retain(|key, _| !key.belongs_to(namespace));
        Ok(())
    }
}
