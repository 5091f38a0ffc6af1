//! Driving port for reading feeds.

use async_trait::async_trait;
use pagination::{Page, RequestedPage};

use crate::domain::{Error, Group, Post, User, UserId};

/// Which posts a feed holds.
///
/// Group slugs and usernames arrive unparsed from the request path; a value
/// that cannot name anything is reported as not found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSelector {
    /// Every post.
    All,
    /// Posts of the group with this slug.
    Group(String),
    /// Posts of the user with this username.
    Author(String),
    /// Posts of every author this user follows.
    Followed(UserId),
}

/// What a feed page is about, for rendering alongside its posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedContext {
    /// The landing feed.
    All,
    /// A group's feed.
    Group(Group),
    /// An author's profile.
    Author {
        /// The profile's owner.
        author: User,
        /// Whether the viewer follows the author.
        following: bool,
    },
    /// The viewer's personalised feed.
    Followed,
}

/// One page of a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    /// What the feed is about.
    pub context: FeedContext,
    /// Posts on the page, newest first.
    pub page: Page<Post>,
}

/// Reads feeds and the group catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedQuery: Send + Sync {
    /// Serve one page of the selected feed to `viewer`.
    async fn feed(
        &self,
        selector: FeedSelector,
        requested: RequestedPage,
        viewer: Option<UserId>,
    ) -> Result<FeedPage, Error>;

    /// Every group, ordered by title.
    async fn groups(&self) -> Result<Vec<Group>, Error>;
}
