//! Post and comment handlers.
//!
//! ```text
//! POST   /api/v1/posts                    multipart form; 303 to author's profile
//! GET    /api/v1/posts/{id}               post, comments and author's post count
//! DELETE /api/v1/posts/{id}               303 to author's profile
//! GET    /api/v1/posts/{id}/edit          prefilled form values
//! POST   /api/v1/posts/{id}/edit          multipart form; 303 to the post
//! POST   /api/v1/posts/{id}/comments      {"text": "..."}; 303 to the post, blank text dropped
//! ```
//!
//! Users who did not write a post are redirected to it instead of being
//! allowed to edit or delete it.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use tracing::debug;

use crate::domain::ports::{DeleteOutcome, EditAccess, EditOutcome};
use crate::domain::{Error, ErrorCode, PostId};
use crate::inbound::http::auth::CurrentUser;
use crate::inbound::http::dto::{CommentRequest, PostDetailView, PostFormView};
use crate::inbound::http::multipart::read_post_draft;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ApiResult, post_location, profile_location, see_other};

fn parse_post_id(raw: &str) -> Result<PostId, Error> {
    raw.parse()
        .map_err(|_| Error::not_found(format!("post {raw} not found")))
}

/// Publish a post.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body(content_type = "multipart/form-data", description = "text, group and image fields"),
    responses(
        (status = 303, description = "Created; redirected to the author's profile"),
        (status = 302, description = "Not logged in; redirected to login"),
        (status = 400, description = "Invalid form", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
pub async fn create(
    state: web::Data<HttpState>,
    user: CurrentUser,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let draft = read_post_draft(payload).await?;
    let post = state.posts.create(user.0, draft).await?;
    Ok(see_other(profile_location(post.author().username())))
}

/// A post with its comments.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Post detail", body = PostDetailView),
        (status = 404, description = "Unknown post", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "getPost"
)]
pub async fn detail(state: web::Data<HttpState>, id: web::Path<String>) -> ApiResult<HttpResponse> {
    let post = parse_post_id(&id)?;
    let detail = state.post_query.detail(post).await?;
    Ok(HttpResponse::Ok().json(PostDetailView::from(&detail)))
}

/// Current values of a post for its author's edit form.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}/edit",
    params(("id" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Prefilled form", body = PostFormView),
        (status = 303, description = "Not the author; redirected to the post"),
        (status = 404, description = "Unknown post", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "getPostForm"
)]
pub async fn edit_form(
    state: web::Data<HttpState>,
    user: CurrentUser,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let post_id = parse_post_id(&id)?;
    match state.post_query.edit_access(user.0, post_id).await? {
        EditAccess::Author(post) => {
            let groups = state.feeds.groups().await?;
            Ok(HttpResponse::Ok().json(PostFormView::prefill(&post, &groups)))
        }
        EditAccess::NotAuthor => Ok(see_other(post_location(post_id))),
    }
}

/// Save an edited post.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/edit",
    params(("id" = String, Path, description = "Post identifier")),
    request_body(content_type = "multipart/form-data", description = "text, group and image fields"),
    responses(
        (status = 303, description = "Saved, or not the author; redirected to the post"),
        (status = 400, description = "Invalid form", body = ErrorSchema),
        (status = 404, description = "Unknown post", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "editPost"
)]
pub async fn edit(
    state: web::Data<HttpState>,
    user: CurrentUser,
    id: web::Path<String>,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let post_id = parse_post_id(&id)?;
    let draft = read_post_draft(payload).await?;
    match state.posts.edit(user.0, post_id, draft).await? {
        EditOutcome::Updated(post) => Ok(see_other(post_location(post.id()))),
        EditOutcome::NotAuthor => Ok(see_other(post_location(post_id))),
    }
}

/// Delete a post and its comments.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    params(("id" = String, Path, description = "Post identifier")),
    responses(
        (status = 303, description = "Deleted; redirected to the author's profile, or to the post for anyone else"),
        (status = 404, description = "Unknown post", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
pub async fn delete(
    state: web::Data<HttpState>,
    user: CurrentUser,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let post_id = parse_post_id(&id)?;
    match state.posts.delete(user.0, post_id).await? {
        DeleteOutcome::Deleted { author } => Ok(see_other(profile_location(author.username()))),
        DeleteOutcome::NotAuthor => Ok(see_other(post_location(post_id))),
    }
}

/// Comment on a post.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/comments",
    params(("id" = String, Path, description = "Post identifier")),
    request_body = CommentRequest,
    responses(
        (status = 303, description = "Redirected to the post; a blank comment is discarded"),
        (status = 404, description = "Unknown post", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "addComment"
)]
pub async fn add_comment(
    state: web::Data<HttpState>,
    user: CurrentUser,
    id: web::Path<String>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let post_id = parse_post_id(&id)?;
    match state
        .posts
        .add_comment(user.0, post_id, payload.into_inner().text)
        .await
    {
        Ok(_) => {}
        Err(err) if err.code() == ErrorCode::InvalidRequest => {
            debug!(post = %post_id, "comment discarded: {}", err.message());
        }
        Err(err) => return Err(err),
    }
    Ok(see_other(post_location(post_id)))
}

#[cfg(test)]
#[path = "posts_tests.rs"]
mod tests;
