//! The follow graph service.
//!
//! Edges are directed `follower -> author`. Following is idempotent and a
//! self-follow is quietly ignored; unfollowing a missing edge is reported as
//! not found.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{FollowGraph, FollowOutcome, FollowRepository, UserRepository};
use crate::domain::{Error, User, UserId, Username};

/// Follow graph service implementing [`FollowGraph`].
pub struct FollowService<F, U> {
    follows: Arc<F>,
    users: Arc<U>,
}

impl<F, U> Clone for FollowService<F, U> {
    fn clone(&self) -> Self {
        Self {
            follows: Arc::clone(&self.follows),
            users: Arc::clone(&self.users),
        }
    }
}

impl<F, U> FollowService<F, U> {
    /// Create the service over its repositories.
    pub const fn new(follows: Arc<F>, users: Arc<U>) -> Self {
        Self { follows, users }
    }
}

impl<F, U> FollowService<F, U>
where
    F: FollowRepository,
    U: UserRepository,
{
    async fn resolve_author(&self, raw: &str) -> Result<User, Error> {
        let not_found = || Error::not_found(format!("user {raw} not found"));
        let username = Username::new(raw).map_err(|_| not_found())?;
        self.users
            .find_by_username(&username)
            .await?
            .ok_or_else(not_found)
    }
}

#[async_trait]
impl<F, U> FollowGraph for FollowService<F, U>
where
    F: FollowRepository,
    U: UserRepository,
{
    async fn follow(&self, follower: UserId, author: String) -> Result<FollowOutcome, Error> {
        let target = self.resolve_author(&author).await?;
        if *target.id() == follower {
            debug!(user = %follower, "ignoring self-follow");
            return Ok(FollowOutcome::SelfIgnored);
        }
        let created = self.follows.insert_if_absent(&follower, target.id()).await?;
        Ok(if created {
            FollowOutcome::Created
        } else {
            FollowOutcome::AlreadyFollowing
        })
    }

    async fn unfollow(&self, follower: UserId, author: String) -> Result<(), Error> {
        let target = self.resolve_author(&author).await?;
        if self.follows.delete(&follower, target.id()).await? {
            Ok(())
        } else {
            Err(Error::not_found(format!("you do not follow {author}")))
        }
    }

    async fn is_following(&self, follower: UserId, author: UserId) -> Result<bool, Error> {
        if follower == author {
            return Ok(false);
        }
        Ok(self.follows.exists(&follower, &author).await?)
    }

    async fn followed_authors(&self, follower: UserId) -> Result<Vec<User>, Error> {
        let ids = self.follows.followed_authors(&follower).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut authors = self.users.find_by_ids(&ids).await?;
        authors.sort_by(|a, b| a.username().cmp(b.username()));
        Ok(authors)
    }
}

#[cfg(test)]
#[path = "follow_tests.rs"]
mod tests;
