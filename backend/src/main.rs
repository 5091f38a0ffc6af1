//! Postboard entry-point: loads settings, picks adapters and serves HTTP.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::{DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use pagination::Paginator;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use postboard::domain::ports::ResponseCache;
use postboard::inbound::http::health::HealthState;
use postboard::inbound::http::session_config::{BuildMode, session_settings_from_env};
use postboard::outbound::cache::{InMemoryResponseCache, RedisResponseCache};
use postboard::outbound::memory::MemoryStore;
use postboard::outbound::persistence::{
    DbPool, DieselGroupRepository, PoolConfig, run_migrations,
};
use postboard::settings::AppSettings;
use postboard::startup::{load_accounts, seed_groups};

use server::{ServerConfig, SessionCookie, Storage, create_server};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %err, "tracing init failed");
    }
}

async fn open_storage(settings: &AppSettings) -> Result<Storage> {
    let Some(url) = settings.database_url.as_deref() else {
        warn!("no database configured; using the in-memory store");
        return Ok(Storage::Memory(Arc::new(MemoryStore::new())));
    };
    run_migrations(url).await.wrap_err("running migrations")?;
    let pool = DbPool::new(PoolConfig::new(url))
        .await
        .wrap_err("connecting to the database")?;
    info!("database pool ready");
    Ok(Storage::Postgres(pool))
}

fn open_cache(settings: &AppSettings) -> Result<Arc<dyn ResponseCache>> {
    match settings.redis_url.as_deref() {
        Some(url) => {
            let cache = RedisResponseCache::connect(url).wrap_err("configuring redis")?;
            info!("landing cache backed by redis");
            Ok(Arc::new(cache))
        }
        None => Ok(Arc::new(InMemoryResponseCache::new(Arc::new(DefaultClock)))),
    }
}

async fn seed(storage: &Storage, settings: &AppSettings) -> Result<()> {
    let Some(path) = settings.groups_file.as_deref() else {
        return Ok(());
    };
    match storage {
        Storage::Memory(store) => seed_groups(&**store, path).await?,
        Storage::Postgres(pool) => {
            seed_groups(&DieselGroupRepository::new(pool.clone()), path).await?
        }
    };
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = AppSettings::load().map_err(|err| eyre!("loading settings: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("reading session settings")?;
    info!(key = %session.key_fingerprint(), "session key loaded");

    let paginator = Paginator::try_new(settings.page_size())
        .map_err(|err| eyre!("invalid page size {}: {err}", settings.page_size()))?;
    let accounts = load_accounts(settings.accounts_file.as_deref())?;
    let storage = open_storage(&settings).await?;
    seed(&storage, &settings).await?;
    let cache = open_cache(&settings)?;

    let config = ServerConfig::new(
        SessionCookie {
            key: session.key,
            secure: session.cookie_secure,
            same_site: session.same_site,
        },
        settings.bind_addr(),
        cache,
        settings.cache_ttl(),
    )
    .with_storage(storage)
    .with_accounts(accounts)
    .with_paginator(paginator)
    .with_media_root(settings.media_root());

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::prometheus()?));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(addr = %settings.bind_addr(), "listening");
    server.await?;
    Ok(())
}
