//! Shared HTTP adapter state.
//!
//! Handlers receive [`HttpState`] through `web::Data` and only ever see
//! driving ports, so they can be exercised against doubles without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FeedQuery, FollowGraph, ImageStore, LoginService, PostCommand, PostQuery,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```ignore
/// let state = HttpState {
///     feeds: Arc::new(feed_service),
///     posts: post_service.clone(),
///     post_query: post_service,
///     follows: Arc::new(follow_service),
///     login: Arc::new(login_service),
///     images: Arc::new(image_store),
/// };
/// ```
#[derive(Clone)]
pub struct HttpState {
    /// Paged feeds and the group catalogue.
    pub feeds: Arc<dyn FeedQuery>,
    /// Post and comment writes.
    pub posts: Arc<dyn PostCommand>,
    /// Post detail and edit access.
    pub post_query: Arc<dyn PostQuery>,
    /// Follow and unfollow.
    pub follows: Arc<dyn FollowGraph>,
    /// Credential checks.
    pub login: Arc<dyn LoginService>,
    /// Stored post images.
    pub images: Arc<dyn ImageStore>,
}
