//! Shared harness for the HTTP integration suites.
//!
//! [`Harness`] owns the adapters behind a fully wired application: the
//! in-memory store, a response cache and a clock the tests move by hand.
//! `service!` turns it into an Actix test service with the production
//! route table, session middleware and tracing.

#![allow(dead_code, reason = "each suite uses a different subset")]

use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::header::LOCATION;
use chrono::Utc;
use pagination::Paginator;
use postboard::domain::ports::{CacheNamespace, GroupRepository, ResponseCache};
use postboard::domain::{
    AccountDirectory, DirectoryLoginService, FeedService, FollowService, Group, GroupId,
    GroupSlug, GroupTitle, PostService,
};
use postboard::inbound::http::cache_page::{CachePage, INDEX_PAGE_NAMESPACE};
use postboard::inbound::http::state::HttpState;
use postboard::outbound::cache::InMemoryResponseCache;
use postboard::outbound::media::InMemoryImageStore;
use postboard::outbound::memory::MemoryStore;
use postboard::test_support::MutableClock;

/// Password shared by every test account.
pub const PASSWORD: &str = "correct horse";
/// Accounts able to log in.
pub const USERS: [&str; 3] = ["alice", "bob", "carol"];
/// Landing cache lifetime used by the harness.
pub const CACHE_TTL: Duration = Duration::from_secs(20);

/// Adapters and state behind one test application.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<MutableClock>,
    pub cache: Arc<InMemoryResponseCache>,
    pub state: HttpState,
    pub key: Key,
}

impl Harness {
    /// Wire services over fresh in-memory adapters.
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(MutableClock::new(Utc::now()));
        let cache = Arc::new(InMemoryResponseCache::new(clock.clone()));
        let images = Arc::new(InMemoryImageStore::new());
        let accounts = AccountDirectory::from_pairs(
            USERS.map(|user| (user.to_owned(), PASSWORD.to_owned())),
        )
        .expect("valid accounts");

        let graph = Arc::new(FollowService::new(store.clone(), store.clone()));
        let feeds = FeedService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            graph.clone(),
            Paginator::default(),
        );
        let posts = Arc::new(PostService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            images.clone(),
            clock.clone(),
        ));
        let state = HttpState {
            feeds: Arc::new(feeds),
            posts: posts.clone(),
            post_query: posts,
            follows: graph,
            login: Arc::new(DirectoryLoginService::new(accounts, store.clone())),
            images,
        };

        Self {
            store,
            clock,
            cache,
            state,
            key: Key::generate(),
        }
    }

    /// Middleware caching the landing feed in the harness cache.
    pub fn index_cache(&self) -> CachePage {
        let cache: Arc<dyn ResponseCache> = self.cache.clone();
        CachePage::new(cache, index_namespace(), CACHE_TTL)
    }

    /// Flush the landing feed cache.
    pub async fn clear_index_cache(&self) {
        self.cache
            .clear(&index_namespace())
            .await
            .expect("cache clears");
    }

    /// Create a group directly in the store.
    pub async fn seed_group(&self, title: &str) -> GroupSlug {
        let title = GroupTitle::new(title).expect("valid title");
        let slug = GroupSlug::from_title(&title).expect("sluggable title");
        let group = Group::new(GroupId::random(), title, slug.clone(), String::new());
        self.store.insert(&group).await.expect("group stored");
        slug
    }

    /// Step the shared clock forward.
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}

fn index_namespace() -> CacheNamespace {
    CacheNamespace::new(INDEX_PAGE_NAMESPACE).expect("valid namespace")
}

/// Build an Actix test service over a [`Harness`].
macro_rules! service {
    ($harness:expr) => {{
        let harness: &$crate::support::Harness = &$harness;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(harness.state.clone()))
                .app_data(actix_web::web::Data::new(
                    postboard::inbound::http::health::HealthState::new(),
                ))
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        harness.key.clone(),
                    )
                    .cookie_name("session".to_owned())
                    .cookie_secure(false)
                    .build(),
                )
                .wrap(postboard::Trace)
                .configure(|cfg| {
                    postboard::inbound::http::routes::configure(cfg, harness.index_cache())
                }),
        )
        .await
    }};
}

/// Log `$user` in with the shared password and return the session cookie.
macro_rules! login {
    ($app:expr, $user:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(serde_json::json!({
                "username": $user,
                "password": $crate::support::PASSWORD,
            }))
            .to_request();
        let res = actix_web::test::call_service(&$app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::OK, "login as {}", $user);
        $crate::support::session_cookie(&res).expect("login sets a session cookie")
    }};
}

/// The `session` cookie set by `res`.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// The `Location` header of a redirect.
pub fn location<B>(res: &ServiceResponse<B>) -> String {
    res.headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("redirect carries a location")
}
