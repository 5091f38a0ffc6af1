//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `POSTBOARD_*` environment variables and
//! configuration files.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::V4(std::net::SocketAddrV4::new(std::net::Ipv4Addr::UNSPECIFIED, 8080));
const DEFAULT_MEDIA_ROOT: &str = "media";
/// Posts per feed page unless configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Landing-page cache lifetime unless configured.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 20;

/// Settings for the `postboard` server.
///
/// Every field has a default, so an empty source set still loads.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(prefix = "POSTBOARD")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Redis URL for the landing-page cache; cached in-process when absent.
    pub redis_url: Option<String>,
    /// Directory holding uploaded images.
    pub media_root: Option<PathBuf>,
    /// Posts per feed page.
    #[ortho_config(default = 10)]
    pub page_size: usize,
    /// Landing-page cache lifetime in seconds.
    #[ortho_config(default = 20)]
    pub cache_ttl_secs: u64,
    /// JSON object mapping usernames to passwords.
    pub accounts_file: Option<PathBuf>,
    /// JSON list of groups to create at start-up.
    pub groups_file: Option<PathBuf>,
}

impl AppSettings {
    /// Configured bind address, defaulting to `0.0.0.0:8080`.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Configured media directory, defaulting to `./media`.
    #[must_use]
    pub fn media_root(&self) -> PathBuf {
        self.media_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT))
    }

    /// Configured page size, defaulting to ten.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Configured landing-page cache lifetime, defaulting to twenty seconds.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            database_url: None,
            redis_url: None,
            media_root: None,
            page_size: DEFAULT_PAGE_SIZE,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            accounts_file: None,
            groups_file: None,
        }
    }
}
