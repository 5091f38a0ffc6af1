//! Port for post persistence.
//!
//! Listings are materialised and ordered newest first; posts sharing a
//! timestamp keep a stable order.
use async_trait::async_trait;

use crate::domain::{GroupId, NewPost, Post, PostChanges, PostId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by post repository adapters.
    pub enum PostPersistenceError {
        /// Connection could not be established.
        Connection { message: String } => ServiceUnavailable: "post repository connection failed: {message}",
        /// Query or mutation failed.
        Query { message: String } => InternalError: "post repository query failed: {message}",
        /// A referenced author or group does not exist.
        MissingReference { message: String } => InvalidRequest: "post references a missing row: {message}",
    }
}

/// Storage of posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post and return it hydrated.
    async fn insert(&self, post: NewPost) -> Result<Post, PostPersistenceError>;

    /// Apply author edits; `None` when the post does not exist.
    async fn update(
        &self,
        id: &PostId,
        changes: PostChanges,
    ) -> Result<Option<Post>, PostPersistenceError>;

    /// Delete a post and its comments; `false` when it did not exist.
    async fn delete(&self, id: &PostId) -> Result<bool, PostPersistenceError>;

    /// Fetch one post.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostPersistenceError>;

    /// Every post.
    async fn list_all(&self) -> Result<Vec<Post>, PostPersistenceError>;

    /// Posts filed under `group`.
    async fn list_by_group(&self, group: &GroupId) -> Result<Vec<Post>, PostPersistenceError>;

    /// Posts written by `author`.
    async fn list_by_author(&self, author: &UserId) -> Result<Vec<Post>, PostPersistenceError>;

    /// Posts written by any of `authors`.
    async fn list_by_authors(
        &self,
        authors: &[UserId],
    ) -> Result<Vec<Post>, PostPersistenceError>;
}
