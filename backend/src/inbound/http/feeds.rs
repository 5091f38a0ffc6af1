//! Paged feed handlers.
//!
//! ```text
//! GET /api/v1/posts?page=N                    every post (cached)
//! GET /api/v1/groups/{slug}/posts?page=N      one group's posts
//! GET /api/v1/profiles/{username}?page=N      one author's posts
//! GET /api/v1/follow?page=N                   followed authors' posts (login)
//! ```
//!
//! Page numbers outside the listing are clamped; anything unparsable reads
//! as the first page.

use actix_web::{HttpRequest, HttpResponse, web};
use pagination::RequestedPage;

use crate::domain::UserId;
use crate::domain::ports::FeedSelector;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{CurrentUser, MaybeUser};
use crate::inbound::http::dto::{FeedResponse, PageQuery};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

async fn render(
    state: &HttpState,
    req: &HttpRequest,
    selector: FeedSelector,
    query: &PageQuery,
    viewer: Option<UserId>,
) -> ApiResult<HttpResponse> {
    let requested = RequestedPage::parse(query.page.as_deref());
    let feed = state.feeds.feed(selector, requested, viewer).await?;
    Ok(HttpResponse::Ok().json(FeedResponse::render(&feed, req.path(), req.query_string())))
}

/// Every post, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(("page" = Option<String>, Query, description = "1-based page number")),
    responses(
        (status = 200, description = "Page of posts", body = FeedResponse,
            headers(("x-cache" = String, description = "hit or miss"))),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["feeds"],
    operation_id = "listPosts"
)]
pub async fn index(
    state: web::Data<HttpState>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    render(&state, &req, FeedSelector::All, &query, None).await
}

/// Posts in one group.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{slug}/posts",
    params(
        ("slug" = String, Path, description = "Group slug"),
        ("page" = Option<String>, Query, description = "1-based page number")
    ),
    responses(
        (status = 200, description = "Group and page of posts", body = FeedResponse),
        (status = 404, description = "Unknown group", body = ErrorSchema)
    ),
    tags = ["feeds"],
    operation_id = "listGroupPosts"
)]
pub async fn group(
    state: web::Data<HttpState>,
    req: HttpRequest,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let selector = FeedSelector::Group(slug.into_inner());
    render(&state, &req, selector, &query, None).await
}

/// Posts by one author, with whether the viewer follows them.
#[utoipa::path(
    get,
    path = "/api/v1/profiles/{username}",
    params(
        ("username" = String, Path, description = "Author handle"),
        ("page" = Option<String>, Query, description = "1-based page number")
    ),
    responses(
        (status = 200, description = "Author and page of posts", body = FeedResponse),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["feeds"],
    operation_id = "listAuthorPosts"
)]
pub async fn profile(
    state: web::Data<HttpState>,
    req: HttpRequest,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
    viewer: MaybeUser,
) -> ApiResult<HttpResponse> {
    let selector = FeedSelector::Author(username.into_inner());
    render(&state, &req, selector, &query, viewer.0).await
}

/// Posts by authors the caller follows.
#[utoipa::path(
    get,
    path = "/api/v1/follow",
    params(("page" = Option<String>, Query, description = "1-based page number")),
    responses(
        (status = 200, description = "Page of followed authors' posts", body = FeedResponse),
        (status = 302, description = "Not logged in; redirected to login")
    ),
    tags = ["feeds"],
    operation_id = "listFollowedPosts"
)]
pub async fn followed(
    state: web::Data<HttpState>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
    user: CurrentUser,
) -> ApiResult<HttpResponse> {
    let selector = FeedSelector::Followed(user.0);
    render(&state, &req, selector, &query, Some(user.0)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FeedContext, FeedPage, MockFeedQuery};
    use crate::domain::{Error, Group, GroupId, GroupSlug, GroupTitle};
    use crate::inbound::http::test_utils::{Doubles, test_session_middleware};
    use actix_web::{App, test};
    use pagination::Paginator;
    use serde_json::Value;

    fn empty_page(context: FeedContext) -> FeedPage {
        FeedPage {
            context,
            page: Paginator::try_new(10)
                .expect("page size")
                .page(Vec::new(), RequestedPage::FIRST),
        }
    }

    #[actix_web::test]
    async fn page_numbers_reach_the_feed_port() {
        let mut feeds = MockFeedQuery::new();
        feeds
            .expect_feed()
            .withf(|selector, requested, viewer| {
                *selector == FeedSelector::All && requested.get() == 3 && viewer.is_none()
            })
            .times(1)
            .returning(|_, _, _| Ok(empty_page(FeedContext::All)));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Doubles::with_feeds(feeds).into_state()))
                .route("/api/v1/posts", web::get().to(index)),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/posts?page=3").to_request(),
        )
        .await;
        assert!(res.status().is_success());
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["context"]["kind"], "index");
        assert_eq!(body["page"]["number"], 1);
    }

    #[actix_web::test]
    async fn group_context_is_rendered() {
        let mut feeds = MockFeedQuery::new();
        feeds
            .expect_feed()
            .withf(|selector, _, _| *selector == FeedSelector::Group("cats".to_owned()))
            .returning(|_, _, _| {
                let group = Group::new(
                    GroupId::random(),
                    GroupTitle::new("Cats").expect("title"),
                    GroupSlug::new("cats").expect("slug"),
                    String::new(),
                );
                Ok(empty_page(FeedContext::Group(group)))
            });
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Doubles::with_feeds(feeds).into_state()))
                .route("/api/v1/groups/{slug}/posts", web::get().to(group)),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/groups/cats/posts").to_request(),
        )
        .await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["context"]["kind"], "group");
        assert_eq!(body["context"]["group"]["title"], "Cats");
    }

    #[actix_web::test]
    async fn unknown_profiles_are_not_found() {
        let mut feeds = MockFeedQuery::new();
        feeds
            .expect_feed()
            .returning(|_, _, _| Err(Error::not_found("user ghost not found")));
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(web::Data::new(Doubles::with_feeds(feeds).into_state()))
                .route("/api/v1/profiles/{username}", web::get().to(profile)),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/profiles/ghost").to_request(),
        )
        .await;
        assert_eq!(res.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
