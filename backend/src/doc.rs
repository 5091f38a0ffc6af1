//! OpenAPI documentation.
//!
//! [`ApiDoc`] registers every HTTP handler plus the error schemas, and adds
//! the session cookie security scheme. Swagger UI serves it in debug builds.

use crate::inbound::http::dto::{
    FeedResponse, GroupsResponse, PostDetailView, PostFormView, UserView,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Postboard API",
        description = "Posts, groups, comments and follows behind a session cookie."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::feeds::index,
        crate::inbound::http::feeds::group,
        crate::inbound::http::feeds::profile,
        crate::inbound::http::feeds::followed,
        crate::inbound::http::groups::list,
        crate::inbound::http::posts::create,
        crate::inbound::http::posts::detail,
        crate::inbound::http::posts::edit_form,
        crate::inbound::http::posts::edit,
        crate::inbound::http::posts::delete,
        crate::inbound::http::posts::add_comment,
        crate::inbound::http::follows::follow,
        crate::inbound::http::follows::unfollow,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::media::image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        FeedResponse,
        GroupsResponse,
        PostDetailView,
        PostFormView,
        UserView
    )),
    tags(
        (name = "feeds", description = "Paged listings of posts"),
        (name = "groups", description = "Group catalogue"),
        (name = "posts", description = "Posts and comments"),
        (name = "follows", description = "Following authors"),
        (name = "users", description = "Login and logout"),
        (name = "media", description = "Uploaded images"),
        (name = "health", description = "Health checks")
    )
)]
pub struct ApiDoc;
