//! Driving port for reading single posts.

use async_trait::async_trait;

use crate::domain::{Comment, Error, Post, PostId, UserId};

/// A post with everything its detail view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetail {
    /// The post.
    pub post: Post,
    /// Comments, oldest first.
    pub comments: Vec<Comment>,
    /// How many posts the author has published.
    pub author_post_count: usize,
}

/// Whether a user may open a post's edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAccess {
    /// The user wrote the post; here are its current values.
    Author(Post),
    /// Someone else wrote the post.
    NotAuthor,
}

/// Reads posts one at a time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostQuery: Send + Sync {
    /// The detail view of `post`.
    async fn detail(&self, post: PostId) -> Result<PostDetail, Error>;

    /// Current values of `post` for `editor`'s edit form.
    async fn edit_access(&self, editor: UserId, post: PostId) -> Result<EditAccess, Error>;
}
