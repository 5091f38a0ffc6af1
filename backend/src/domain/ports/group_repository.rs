//! Port for group persistence.
use async_trait::async_trait;

use crate::domain::{Group, GroupId, GroupSlug};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by group repository adapters.
    pub enum GroupPersistenceError {
        /// Connection could not be established.
        Connection { message: String } => ServiceUnavailable: "group repository connection failed: {message}",
        /// Query or mutation failed.
        Query { message: String } => InternalError: "group repository query failed: {message}",
        /// Another group already uses the slug.
        DuplicateSlug { slug: String } => Conflict: "a group with slug {slug} already exists",
    }
}

/// Storage of groups. Groups are created by administrators.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Fetch a group by its slug.
    async fn find_by_slug(&self, slug: &GroupSlug) -> Result<Option<Group>, GroupPersistenceError>;

    /// Fetch a group by identifier.
    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, GroupPersistenceError>;

    /// Every group, ordered by title.
    async fn list(&self) -> Result<Vec<Group>, GroupPersistenceError>;

    /// Register a new group.
    async fn insert(&self, group: &Group) -> Result<(), GroupPersistenceError>;
}
