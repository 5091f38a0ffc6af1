//! Login enforcement.
//!
//! [`RequireLogin`] wraps the resources that need a logged-in user and
//! sends anonymous callers to the login endpoint with `next` set to the
//! path they asked for. Handlers behind it read the user through
//! [`CurrentUser`]; public handlers that merely care use [`MaybeUser`].

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_session::SessionExt;
use actix_web::body::EitherBody;
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::LOCATION;
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;
use url::form_urlencoded;

use crate::domain::{Error, UserId};

use super::session::SessionContext;

/// Default login entry point.
pub const LOGIN_PATH: &str = "/api/v1/login";

/// Where to send an anonymous caller who asked for `requested`.
///
/// # Examples
/// ```
/// use postboard::inbound::http::auth::login_redirect;
///
/// assert_eq!(
///     login_redirect("/api/v1/login", "/api/v1/follow?page=2"),
///     "/api/v1/login?next=%2Fapi%2Fv1%2Ffollow%3Fpage%3D2",
/// );
/// ```
#[must_use]
pub fn login_redirect(login_path: &str, requested: &str) -> String {
    let next: String = form_urlencoded::byte_serialize(requested.as_bytes()).collect();
    format!("{login_path}?next={next}")
}

fn session_user(req: &HttpRequest) -> Result<Option<UserId>, Error> {
    SessionContext::new(req.get_session()).user_id()
}

/// Middleware redirecting anonymous callers to the login endpoint.
#[derive(Clone, Debug)]
pub struct RequireLogin {
    login_path: Rc<str>,
}

impl RequireLogin {
    /// Redirect to `login_path`.
    #[must_use]
    pub fn new(login_path: &str) -> Self {
        Self {
            login_path: Rc::from(login_path),
        }
    }
}

impl Default for RequireLogin {
    fn default() -> Self {
        Self::new(LOGIN_PATH)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireLogin
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequireLoginMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireLoginMiddleware {
            service,
            login_path: Rc::clone(&self.login_path),
        }))
    }
}

/// Service produced by [`RequireLogin`].
pub struct RequireLoginMiddleware<S> {
    service: S,
    login_path: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for RequireLoginMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match session_user(req.request()) {
            Ok(Some(_)) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Ok(None) => {
                let requested = req
                    .uri()
                    .path_and_query()
                    .map_or_else(|| req.path().to_owned(), ToString::to_string);
                debug!(path = %requested, "redirecting anonymous caller to login");
                let location = login_redirect(&self.login_path, &requested);
                let response = HttpResponse::Found()
                    .insert_header((LOCATION, location))
                    .finish();
                Box::pin(ready(Ok(req.into_response(response).map_into_right_body())))
            }
            Err(err) => Box::pin(ready(Err(err.into()))),
        }
    }
}

/// The logged-in user; `401` when there is none.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = session_user(req)
            .and_then(|found| found.ok_or_else(|| Error::unauthorized("login required")));
        ready(user.map(Self).map_err(Into::into))
    }
}

/// The logged-in user, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaybeUser(pub Option<UserId>);

impl FromRequest for MaybeUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(session_user(req).map(Self).map_err(Into::into))
    }
}
