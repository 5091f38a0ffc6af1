//! Port for comment persistence.
use async_trait::async_trait;

use crate::domain::{Comment, NewComment, PostId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by comment repository adapters.
    pub enum CommentPersistenceError {
        /// Connection could not be established.
        Connection { message: String } => ServiceUnavailable: "comment repository connection failed: {message}",
        /// Query or mutation failed.
        Query { message: String } => InternalError: "comment repository query failed: {message}",
        /// The post or author does not exist.
        MissingReference { message: String } => NotFound: "comment references a missing row: {message}",
    }
}

/// Storage of comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a comment and return it hydrated.
    async fn insert(&self, comment: NewComment) -> Result<Comment, CommentPersistenceError>;

    /// Comments under `post`, oldest first.
    async fn list_for_post(&self, post: &PostId) -> Result<Vec<Comment>, CommentPersistenceError>;
}
