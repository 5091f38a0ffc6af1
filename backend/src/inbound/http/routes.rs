//! Route table.
//!
//! Reads and writes that share a path are separate resources with method
//! guards, so only the landing feed's `GET` goes through [`CachePage`] and
//! only writes go through [`RequireLogin`].

use actix_web::{guard, web};

use super::auth::RequireLogin;
use super::cache_page::CachePage;
use super::dto::MEDIA_PREFIX;
use super::{API_PREFIX, feeds, follows, groups, health, media, posts, users};

/// Mount the API, the media route and the health checks.
///
/// `index_cache` wraps `GET /api/v1/posts`.
///
/// # Examples
/// ```ignore
/// App::new()
///     .app_data(web::Data::new(http_state))
///     .app_data(web::Data::new(HealthState::new()))
///     .configure(|cfg| routes::configure(cfg, index_cache));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig, index_cache: CachePage) {
    cfg.service(
        web::scope(API_PREFIX)
            .service(
                web::resource("/posts")
                    .guard(guard::Get())
                    .wrap(index_cache)
                    .to(feeds::index),
            )
            .service(
                web::resource("/posts")
                    .guard(guard::Post())
                    .wrap(RequireLogin::default())
                    .to(posts::create),
            )
            .service(
                web::resource("/posts/{id}")
                    .guard(guard::Get())
                    .to(posts::detail),
            )
            .service(
                web::resource("/posts/{id}")
                    .guard(guard::Delete())
                    .wrap(RequireLogin::default())
                    .to(posts::delete),
            )
            .service(
                web::resource("/posts/{id}/edit")
                    .wrap(RequireLogin::default())
                    .route(web::get().to(posts::edit_form))
                    .route(web::post().to(posts::edit)),
            )
            .service(
                web::resource("/posts/{id}/comments")
                    .wrap(RequireLogin::default())
                    .route(web::post().to(posts::add_comment)),
            )
            .route("/groups", web::get().to(groups::list))
            .route("/groups/{slug}/posts", web::get().to(feeds::group))
            .route("/profiles/{username}", web::get().to(feeds::profile))
            .service(
                web::resource("/profiles/{username}/follow")
                    .wrap(RequireLogin::default())
                    .route(web::post().to(follows::follow)),
            )
            .service(
                web::resource("/profiles/{username}/unfollow")
                    .wrap(RequireLogin::default())
                    .route(web::post().to(follows::unfollow)),
            )
            .service(
                web::resource("/follow")
                    .wrap(RequireLogin::default())
                    .route(web::get().to(feeds::followed)),
            )
            .route("/login", web::post().to(users::login))
            .route("/logout", web::post().to(users::logout)),
    )
    .route(
        &format!("{MEDIA_PREFIX}/{{reference:.*}}"),
        web::get().to(media::image),
    )
    .route("/health/ready", web::get().to(health::ready))
    .route("/health/live", web::get().to(health::live));
}
