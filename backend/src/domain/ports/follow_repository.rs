//! Port for the follow graph.
use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by follow repository adapters.
    pub enum FollowPersistenceError {
        /// Connection could not be established.
        Connection { message: String } => ServiceUnavailable: "follow repository connection failed: {message}",
        /// Query or mutation failed.
        Query { message: String } => InternalError: "follow repository query failed: {message}",
        /// An edge from a user to themselves was rejected by the store.
        SelfFollow => InvalidRequest: "users cannot follow themselves",
    }
}

/// Directed `follower -> author` edges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Create the edge unless it already exists; `true` when created.
    ///
    /// Must be atomic: concurrent calls for the same pair create one edge.
    async fn insert_if_absent(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<bool, FollowPersistenceError>;

    /// Remove the edge; `false` when it did not exist.
    async fn delete(&self, follower: &UserId, author: &UserId)
    -> Result<bool, FollowPersistenceError>;

    /// Whether the edge exists.
    async fn exists(&self, follower: &UserId, author: &UserId)
    -> Result<bool, FollowPersistenceError>;

    /// Authors `follower` follows.
    async fn followed_authors(&self, follower: &UserId)
    -> Result<Vec<UserId>, FollowPersistenceError>;
}
