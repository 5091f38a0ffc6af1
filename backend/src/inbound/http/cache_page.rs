//! Whole-response caching for public listings.
//!
//! [`CachePage`] stores successful `GET` responses under a key derived from
//! the request path and query, and replays them until the TTL runs out.
//! Writes elsewhere never evict entries, so a deleted post stays visible on
//! a cached page until it expires or the namespace is cleared. A failing
//! cache backend is logged and bypassed.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::body::{BoxBody, MessageBody, to_bytes};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use actix_web::http::{Method, StatusCode};
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, warn};

use crate::domain::ports::{CacheKey, CacheNamespace, CachedPage, ResponseCache};

/// Response header reporting `hit` or `miss`.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Namespace of the landing feed.
pub const INDEX_PAGE_NAMESPACE: &str = "index_page";

/// Default lifetime of a cached landing page.
pub const DEFAULT_TTL: Duration = Duration::from_secs(20);

struct Policy {
    cache: Arc<dyn ResponseCache>,
    namespace: CacheNamespace,
    ttl: Duration,
}

/// Caching middleware; wrap it around individual resources.
#[derive(Clone)]
pub struct CachePage {
    policy: Rc<Policy>,
}

impl CachePage {
    /// Cache responses in `namespace` of `cache` for `ttl`.
    #[must_use]
    pub fn new(cache: Arc<dyn ResponseCache>, namespace: CacheNamespace, ttl: Duration) -> Self {
        Self {
            policy: Rc::new(Policy {
                cache,
                namespace,
                ttl,
            }),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CachePage
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = CachePageMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CachePageMiddleware {
            service: Rc::new(service),
            policy: Rc::clone(&self.policy),
        }))
    }
}

/// Service produced by [`CachePage`].
pub struct CachePageMiddleware<S> {
    service: Rc<S>,
    policy: Rc<Policy>,
}

fn status_header(value: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(CACHE_STATUS_HEADER),
        HeaderValue::from_static(value),
    )
}

fn replay(page: CachedPage) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    if let Some(content_type) = page.content_type {
        builder.insert_header((CONTENT_TYPE, content_type));
    }
    builder.insert_header(status_header("hit")).body(page.body)
}

impl Policy {
    async fn lookup(&self, key: &CacheKey) -> Option<CachedPage> {
        match self.cache.get(key).await {
            Ok(found) => found,
            Err(err) => {
                warn!(error = %err, key = %key, "response cache read failed; rendering live");
                None
            }
        }
    }

    async fn store(&self, key: &CacheKey, page: &CachedPage) {
        if let Err(err) = self.cache.put(key, page, self.ttl).await {
            warn!(error = %err, key = %key, "response cache write failed");
        }
    }
}

impl<S, B> Service<ServiceRequest> for CachePageMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        if req.method() != Method::GET {
            return Box::pin(async move {
                service.call(req).await.map(ServiceResponse::map_into_boxed_body)
            });
        }
        let policy = Rc::clone(&self.policy);
        let uri = req.uri().to_string();
        let key = policy.namespace.key_for(&uri);

        Box::pin(async move {
            if let Some(page) = policy.lookup(&key).await {
                debug!(uri = %uri, "serving cached page");
                return Ok(req.into_response(replay(page)));
            }

            let res = service.call(req).await?;
            if res.status() != StatusCode::OK {
                return Ok(res.map_into_boxed_body());
            }
            let (http_req, response) = res.into_parts();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let (mut head, body) = response.into_parts();
            let bytes = to_bytes(body).await.map_err(|err| {
                let err: Box<dyn std::error::Error> = err.into();
                actix_web::error::ErrorInternalServerError(err.to_string())
            })?;
            policy
                .store(
                    &key,
                    &CachedPage {
                        content_type,
                        body: bytes.to_vec(),
                    },
                )
                .await;
            let (name, value) = status_header("miss");
            head.headers_mut().insert(name, value);
            Ok(ServiceResponse::new(http_req, head.set_body(BoxBody::new(bytes))))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockResponseCache, ResponseCacheError};
    use crate::outbound::cache::InMemoryResponseCache;
    use crate::test_support::MutableClock;
    use actix_web::{App, HttpResponse, test, web};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn namespace() -> CacheNamespace {
        CacheNamespace::new(INDEX_PAGE_NAMESPACE).expect("valid namespace")
    }

    macro_rules! counting_app {
        ($cache:expr, $hits:expr) => {{
            let hits = Arc::clone(&$hits);
            test::init_service(
                App::new().service(
                    web::resource("/posts")
                        .wrap(CachePage::new($cache, namespace(), DEFAULT_TTL))
                        .route(web::get().to(move || {
                            let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
                            async move { HttpResponse::Ok().json(serde_json::json!({ "render": n })) }
                        }))
                        .route(web::post().to(|| async { HttpResponse::SeeOther().finish() })),
                ),
            )
            .await
        }};
    }

    fn header(res: &ServiceResponse<BoxBody>) -> Option<&str> {
        res.headers()
            .get(CACHE_STATUS_HEADER)
            .and_then(|value| value.to_str().ok())
    }

    #[actix_web::test]
    async fn replays_until_the_ttl_elapses() {
        let clock = Arc::new(MutableClock::new(chrono::Utc::now()));
        let cache = Arc::new(InMemoryResponseCache::new(clock.clone()));
        let renders = Arc::new(AtomicUsize::new(0));
        let app = counting_app!(cache, renders);

        let first = test::call_service(&app, test::TestRequest::get().uri("/posts").to_request())
            .await;
        assert_eq!(header(&first), Some("miss"));
        let first_body = test::read_body(first).await;

        clock.advance(Duration::from_secs(19));
        let second = test::call_service(&app, test::TestRequest::get().uri("/posts").to_request())
            .await;
        assert_eq!(header(&second), Some("hit"));
        assert_eq!(
            second.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        assert_eq!(test::read_body(second).await, first_body);
        assert_eq!(renders.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(1));
        let third = test::call_service(&app, test::TestRequest::get().uri("/posts").to_request())
            .await;
        assert_eq!(header(&third), Some("miss"));
        assert_eq!(renders.load(Ordering::SeqCst), 2);
    }

    #[actix_web::test]
    async fn pages_are_keyed_by_query() {
        let clock = Arc::new(MutableClock::new(chrono::Utc::now()));
        let cache = Arc::new(InMemoryResponseCache::new(clock));
        let renders = Arc::new(AtomicUsize::new(0));
        let app = counting_app!(cache, renders);

        for uri in ["/posts", "/posts?page=2", "/posts"] {
            test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        }
        assert_eq!(renders.load(Ordering::SeqCst), 2);
    }

    #[actix_web::test]
    async fn non_get_requests_bypass_the_cache() {
        let mut cache = MockResponseCache::new();
        cache.expect_get().never();
        cache.expect_put().never();
        let renders = Arc::new(AtomicUsize::new(0));
        let app = counting_app!(Arc::new(cache), renders);

        let res = test::call_service(&app, test::TestRequest::post().uri("/posts").to_request())
            .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert!(header(&res).is_none());
    }

    #[actix_web::test]
    async fn failing_backends_fall_back_to_live_rendering() {
        let mut cache = MockResponseCache::new();
        cache
            .expect_get()
            .returning(|_| Err(ResponseCacheError::backend("connection refused")));
        cache
            .expect_put()
            .returning(|_, _, _| Err(ResponseCacheError::backend("connection refused")));
        let renders = Arc::new(AtomicUsize::new(0));
        let app = counting_app!(Arc::new(cache), renders);

        for _ in 0..2 {
            let res = test::call_service(&app, test::TestRequest::get().uri("/posts").to_request())
                .await;
            assert_eq!(res.status(), StatusCode::OK);
        }
        assert_eq!(renders.load(Ordering::SeqCst), 2);
    }
}
