//! HTTP inbound adapter exposing the REST API.
//!
//! Handlers translate requests into calls on the driving ports held by
//! [`state::HttpState`] and map the results to JSON views or `303`
//! redirects. [`routes::configure`] mounts them under [`API_PREFIX`].

use actix_web::HttpResponse;
use actix_web::http::header::LOCATION;

pub mod auth;
pub mod cache_page;
pub mod dto;
pub mod error;
pub mod feeds;
pub mod follows;
pub mod groups;
pub mod health;
pub mod media;
pub mod multipart;
pub mod posts;
pub mod routes;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

/// Path prefix of every API endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// `303 See Other` pointing at `location`.
pub(crate) fn see_other(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location.as_ref()))
        .finish()
}

pub(crate) fn profile_location(username: impl std::fmt::Display) -> String {
    format!("{API_PREFIX}/profiles/{username}")
}

pub(crate) fn post_location(post: impl std::fmt::Display) -> String {
    format!("{API_PREFIX}/posts/{post}")
}
