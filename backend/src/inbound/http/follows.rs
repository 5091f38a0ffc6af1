//! Follow handlers.
//!
//! ```text
//! POST /api/v1/profiles/{username}/follow
//! POST /api/v1/profiles/{username}/unfollow
//! ```
//!
//! Both redirect to the followed-authors feed.

use actix_web::{HttpResponse, web};
use tracing::debug;

use crate::domain::ports::FollowOutcome;
use crate::inbound::http::auth::CurrentUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{API_PREFIX, ApiResult, see_other};

fn follow_feed() -> HttpResponse {
    see_other(format!("{API_PREFIX}/follow"))
}

/// Follow an author. Following yourself or someone already followed
/// changes nothing.
#[utoipa::path(
    post,
    path = "/api/v1/profiles/{username}/follow",
    params(("username" = String, Path, description = "Author handle")),
    responses(
        (status = 303, description = "Redirected to the followed-authors feed"),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["follows"],
    operation_id = "followAuthor"
)]
pub async fn follow(
    state: web::Data<HttpState>,
    user: CurrentUser,
    username: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let outcome = state.follows.follow(user.0, username.into_inner()).await?;
    if outcome != FollowOutcome::Created {
        debug!(?outcome, "follow request left the graph unchanged");
    }
    Ok(follow_feed())
}

/// Stop following an author.
#[utoipa::path(
    post,
    path = "/api/v1/profiles/{username}/unfollow",
    params(("username" = String, Path, description = "Author handle")),
    responses(
        (status = 303, description = "Redirected to the followed-authors feed"),
        (status = 404, description = "Unknown user or not following", body = ErrorSchema)
    ),
    tags = ["follows"],
    operation_id = "unfollowAuthor"
)]
pub async fn unfollow(
    state: web::Data<HttpState>,
    user: CurrentUser,
    username: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.follows.unfollow(user.0, username.into_inner()).await?;
    Ok(follow_feed())
}
