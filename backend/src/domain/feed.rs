//! Feed assembly.
//!
//! A [`FeedSelector`] picks the posts, the [`Paginator`] cuts the page.
//! Repositories hand back fully ordered sequences, so the page is always a
//! slice of the complete listing.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Paginator, RequestedPage};

use crate::domain::ports::{
    FeedContext, FeedPage, FeedQuery, FeedSelector, FollowGraph, GroupRepository, PostRepository,
    UserRepository,
};
use crate::domain::{Error, Group, GroupSlug, Post, User, UserId, Username};

/// Feed service implementing [`FeedQuery`].
pub struct FeedService<P, G, U, F> {
    posts: Arc<P>,
    groups: Arc<G>,
    users: Arc<U>,
    graph: Arc<F>,
    paginator: Paginator,
}

impl<P, G, U, F> FeedService<P, G, U, F> {
    /// Create the service.
    pub const fn new(
        posts: Arc<P>,
        groups: Arc<G>,
        users: Arc<U>,
        graph: Arc<F>,
        paginator: Paginator,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            graph,
            paginator,
        }
    }
}

impl<P, G, U, F> FeedService<P, G, U, F>
where
    P: PostRepository,
    G: GroupRepository,
    U: UserRepository,
    F: FollowGraph,
{
    async fn group_feed(&self, raw_slug: &str) -> Result<(FeedContext, Vec<Post>), Error> {
        let not_found = || Error::not_found(format!("group {raw_slug} not found"));
        let slug = GroupSlug::new(raw_slug).map_err(|_| not_found())?;
        let group: Group = self.groups.find_by_slug(&slug).await?.ok_or_else(not_found)?;
        let posts = self.posts.list_by_group(group.id()).await?;
        Ok((FeedContext::Group(group), posts))
    }

    async fn author_feed(
        &self,
        raw_username: &str,
        viewer: Option<UserId>,
    ) -> Result<(FeedContext, Vec<Post>), Error> {
        let not_found = || Error::not_found(format!("user {raw_username} not found"));
        let username = Username::new(raw_username).map_err(|_| not_found())?;
        let author: User = self
            .users
            .find_by_username(&username)
            .await?
            .ok_or_else(not_found)?;
        let following = match viewer {
            Some(reader) if reader != *author.id() => {
                self.graph.is_following(reader, *author.id()).await?
            }
            _ => false,
        };
        let posts = self.posts.list_by_author(author.id()).await?;
        Ok((FeedContext::Author { author, following }, posts))
    }

    async fn followed_feed(&self, reader: UserId) -> Result<(FeedContext, Vec<Post>), Error> {
        let authors: Vec<UserId> = self
            .graph
            .followed_authors(reader)
            .await?
            .iter()
            .map(|author| *author.id())
            .collect();
        let posts = if authors.is_empty() {
            Vec::new()
        } else {
            self.posts.list_by_authors(&authors).await?
        };
        Ok((FeedContext::Followed, posts))
    }
}

#[async_trait]
impl<P, G, U, F> FeedQuery for FeedService<P, G, U, F>
where
    P: PostRepository,
    G: GroupRepository,
    U: UserRepository,
    F: FollowGraph,
{
    async fn feed(
        &self,
        selector: FeedSelector,
        requested: RequestedPage,
        viewer: Option<UserId>,
    ) -> Result<FeedPage, Error> {
        let (context, posts) = match selector {
            FeedSelector::All => (FeedContext::All, self.posts.list_all().await?),
            FeedSelector::Group(slug) => self.group_feed(&slug).await?,
            FeedSelector::Author(username) => self.author_feed(&username, viewer).await?,
            FeedSelector::Followed(reader) => self.followed_feed(reader).await?,
        };
        Ok(FeedPage {
            context,
            page: self.paginator.page(posts, requested),
        })
    }

    async fn groups(&self) -> Result<Vec<Group>, Error> {
        Ok(self.groups.list().await?)
    }
}

#[cfg(test)]
#[path = "feed_tests.rs"]
mod tests;
