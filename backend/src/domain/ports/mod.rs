//! Ports at the hexagonal boundary.
//!
//! Driven ports (repositories, caches, stores) are implemented by outbound
//! adapters. Driving ports (`*Query`, `*Command`, [`FollowGraph`],
//! [`LoginService`]) are implemented by domain services and called by
//! inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_key;
mod comment_repository;
mod feed_query;
mod follow_graph;
mod follow_repository;
mod group_repository;
mod image_store;
mod login_service;
mod post_command;
mod post_query;
mod post_repository;
mod response_cache;
mod user_repository;

pub use cache_key::{CacheKey, CacheKeyValidationError, CacheNamespace};
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentPersistenceError, CommentRepository};
#[cfg(test)]
pub use feed_query::MockFeedQuery;
pub use feed_query::{FeedContext, FeedPage, FeedQuery, FeedSelector};
#[cfg(test)]
pub use follow_graph::MockFollowGraph;
pub use follow_graph::{FollowGraph, FollowOutcome};
#[cfg(test)]
pub use follow_repository::MockFollowRepository;
pub use follow_repository::{FollowPersistenceError, FollowRepository};
#[cfg(test)]
pub use group_repository::MockGroupRepository;
pub use group_repository::{GroupPersistenceError, GroupRepository};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use post_command::MockPostCommand;
pub use post_command::{DeleteOutcome, EditOutcome, PostCommand};
#[cfg(test)]
pub use post_query::MockPostQuery;
pub use post_query::{EditAccess, PostDetail, PostQuery};
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{PostPersistenceError, PostRepository};
#[cfg(test)]
pub use response_cache::MockResponseCache;
pub use response_cache::{CachedPage, ResponseCache, ResponseCacheError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
