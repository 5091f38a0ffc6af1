//! HTTP server configuration object.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use pagination::Paginator;
use postboard::domain::AccountDirectory;
use postboard::domain::ports::ResponseCache;
use postboard::outbound::memory::MemoryStore;
use postboard::outbound::persistence::DbPool;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Where posts, groups, comments, users and follows live.
#[derive(Clone)]
pub enum Storage {
    /// Process-local store, lost on restart.
    Memory(Arc<MemoryStore>),
    /// PostgreSQL through the Diesel repositories.
    Postgres(DbPool),
}

/// Everything `create_server` needs besides the health state.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) accounts: AccountDirectory,
    pub(crate) paginator: Paginator,
    pub(crate) cache: Arc<dyn ResponseCache>,
    pub(crate) cache_ttl: Duration,
    pub(crate) storage: Storage,
    pub(crate) media_root: PathBuf,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

/// Session cookie settings.
pub struct SessionCookie {
    /// Signing and encryption key.
    pub key: Key,
    /// Whether the cookie carries `Secure`.
    pub secure: bool,
    /// `SameSite` policy.
    pub same_site: SameSite,
}

impl ServerConfig {
    /// Combine session and listener settings with the landing cache.
    #[must_use]
    pub fn new(
        session: SessionCookie,
        bind_addr: SocketAddr,
        cache: Arc<dyn ResponseCache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            key: session.key,
            cookie_secure: session.secure,
            same_site: session.same_site,
            bind_addr,
            accounts: AccountDirectory::default(),
            paginator: Paginator::default(),
            cache,
            cache_ttl,
            storage: Storage::Memory(Arc::new(MemoryStore::new())),
            media_root: PathBuf::from("media"),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Replace the default in-memory store.
    #[must_use]
    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = storage;
        self
    }

    /// Accounts allowed to log in.
    #[must_use]
    pub fn with_accounts(mut self, accounts: AccountDirectory) -> Self {
        self.accounts = accounts;
        self
    }

    /// Feed page size.
    #[must_use]
    pub fn with_paginator(mut self, paginator: Paginator) -> Self {
        self.paginator = paginator;
        self
    }

    /// Directory for uploaded images.
    #[must_use]
    pub fn with_media_root(mut self, root: PathBuf) -> Self {
        self.media_root = root;
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
