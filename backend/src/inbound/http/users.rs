//! Login and logout handlers.
//!
//! ```text
//! POST /api/v1/login?next=/api/v1/follow {"username":"alice","password":"s3cret"}
//! POST /api/v1/logout
//! ```

use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::info;

use crate::domain::{Error, LoginCredentials, LoginValidationError};
use crate::inbound::http::dto::{LoginRequest, NextQuery, UserView};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{API_PREFIX, ApiResult, see_other};

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::InvalidUsername => ("username", "invalid_username"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

/// Local redirect target from `?next=`, if it is one.
///
/// Only same-origin absolute paths are followed.
fn local_target(next: Option<&str>) -> Option<&str> {
    next.filter(|path| path.starts_with('/') && !path.starts_with("//") && !path.contains('\\'))
}

/// Authenticate and establish a session.
///
/// Redirects to `next` when given, otherwise answers with the user.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    params(("next" = Option<String>, Query, description = "Local path to continue to")),
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = UserView,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 303, description = "Logged in; redirected to next"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<NextQuery>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(user.id())?;
    info!(user = %user.username(), "user logged in");
    match local_target(query.next.as_deref()) {
        Some(next) => Ok(see_other(next)),
        None => Ok(HttpResponse::Ok().json(UserView::from(&user))),
    }
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 303, description = "Logged out; redirected to the index")),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    see_other(format!("{API_PREFIX}/posts"))
}
