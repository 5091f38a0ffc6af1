//! Helpers shared by the HTTP adapter's unit tests.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, web};
use std::sync::Arc;

use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::{Error, UserId};
use crate::domain::ports::{
    MockFeedQuery, MockFollowGraph, MockImageStore, MockLoginService, MockPostCommand,
    MockPostQuery,
};

/// Cookie session middleware with a throwaway key and no `Secure` flag.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by `res`, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Port doubles for building an [`HttpState`]; unset ports expect no calls.
#[derive(Default)]
pub struct Doubles {
    /// Feed double.
    pub feeds: MockFeedQuery,
    /// Post command double.
    pub posts: MockPostCommand,
    /// Post query double.
    pub post_query: MockPostQuery,
    /// Follow graph double.
    pub follows: MockFollowGraph,
    /// Login double.
    pub login: MockLoginService,
    /// Image store double.
    pub images: MockImageStore,
}

impl Doubles {
    /// Doubles with only `feeds` set.
    pub fn with_feeds(feeds: MockFeedQuery) -> Self {
        Self {
            feeds,
            ..Self::default()
        }
    }

    /// Bundle the doubles for handlers.
    pub fn into_state(self) -> HttpState {
        HttpState {
            feeds: Arc::new(self.feeds),
            posts: Arc::new(self.posts),
            post_query: Arc::new(self.post_query),
            follows: Arc::new(self.follows),
            login: Arc::new(self.login),
            images: Arc::new(self.images),
        }
    }
}

/// Path of [`test_login`]; mount it with `.route(TEST_LOGIN_ROUTE, web::get().to(test_login))`.
pub const TEST_LOGIN_ROUTE: &str = "/test/login/{user}";

/// Store the path's user id in the session.
pub async fn test_login(
    session: SessionContext,
    user: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let id = UserId::new(user.as_str()).map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(&id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Log `$user` in through [`test_login`] and return the session cookie.
macro_rules! login_cookie {
    ($app:expr, $user:expr) => {{
        let res = actix_web::test::call_service(
            &$app,
            actix_web::test::TestRequest::get()
                .uri(&format!("/test/login/{}", $user))
                .to_request(),
        )
        .await;
        $crate::inbound::http::test_utils::session_cookie(&res).expect("login sets a cookie")
    }};
}
pub(crate) use login_cookie;
