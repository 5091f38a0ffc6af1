//! Driving port for writing posts and comments.

use async_trait::async_trait;

use crate::domain::{Comment, Error, Post, PostDraft, PostId, User, UserId};

/// Result of an edit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The author's changes were saved.
    Updated(Post),
    /// The editor is not the author; nothing changed.
    NotAuthor,
}

/// Result of a delete attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The post and its comments are gone.
    Deleted {
        /// The former author.
        author: User,
    },
    /// The requester is not the author; nothing changed.
    NotAuthor,
}

/// Creates, edits and deletes posts; adds comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostCommand: Send + Sync {
    /// Publish a post by `author`.
    async fn create(&self, author: UserId, draft: PostDraft) -> Result<Post, Error>;

    /// Apply `draft` to `post` when `editor` wrote it.
    async fn edit(&self, editor: UserId, post: PostId, draft: PostDraft)
    -> Result<EditOutcome, Error>;

    /// Delete `post` when `requester` wrote it.
    async fn delete(&self, requester: UserId, post: PostId) -> Result<DeleteOutcome, Error>;

    /// Comment on `post`.
    async fn add_comment(&self, author: UserId, post: PostId, text: String)
    -> Result<Comment, Error>;
}
