//! PostgreSQL persistence adapters.
//!
//! Repositories translate between Diesel rows (`models`, `schema`) and domain
//! types; neither leaks past this module. Connections come from a `bb8` pool
//! through `diesel-async`, and every Diesel or pool failure is mapped onto the
//! port's own error enum.
//!
//! ```ignore
//! use postboard::outbound::persistence::{DbPool, DieselPostRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/postboard")).await?;
//! let posts = DieselPostRepository::new(pool);
//! ```

mod diesel_comment_repository;
mod diesel_follow_repository;
mod diesel_group_repository;
pub(crate) mod diesel_helpers;
mod diesel_post_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_follow_repository::DieselFollowRepository;
pub use diesel_group_repository::DieselGroupRepository;
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
