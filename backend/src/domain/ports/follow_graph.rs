//! Driving port for the follow graph.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Result of a follow request. None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    /// A new edge was created.
    Created,
    /// The edge already existed.
    AlreadyFollowing,
    /// The user asked to follow themselves; ignored.
    SelfIgnored,
}

/// Follows and unfollows authors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowGraph: Send + Sync {
    /// Follow the author named `author`.
    async fn follow(&self, follower: UserId, author: String) -> Result<FollowOutcome, Error>;

    /// Stop following the author named `author`.
    async fn unfollow(&self, follower: UserId, author: String) -> Result<(), Error>;

    /// Whether `follower` follows `author`.
    async fn is_following(&self, follower: UserId, author: UserId) -> Result<bool, Error>;

    /// The authors `follower` follows.
    async fn followed_authors(&self, follower: UserId) -> Result<Vec<User>, Error>;
}
