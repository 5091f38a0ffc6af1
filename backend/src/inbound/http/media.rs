//! Serving stored post images.
//!
//! ```text
//! GET /media/posts/cat.gif
//! ```

use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{HttpResponse, web};

use crate::domain::{Error, ImageFormat, ImageRef};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Stored image bytes.
#[utoipa::path(
    get,
    path = "/media/{reference}",
    params(("reference" = String, Path, description = "Storage reference, e.g. posts/cat.gif")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 404, description = "No such image", body = ErrorSchema)
    ),
    tags = ["media"],
    operation_id = "getImage",
    security([])
)]
pub async fn image(
    state: web::Data<HttpState>,
    reference: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let reference = reference.into_inner();
    let image = ImageRef::from_stored(reference.clone());
    let bytes = state
        .images
        .load(&image)
        .await?
        .ok_or_else(|| Error::not_found(format!("image {reference} not found")))?;
    let content_type =
        ImageFormat::sniff(&bytes).map_or("application/octet-stream", ImageFormat::mime_type);
    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, content_type))
        .insert_header((CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{ImageStoreError, MockImageStore};
    use crate::inbound::http::test_utils::Doubles;
    use crate::test_support::SMALL_GIF;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    macro_rules! media_app {
        ($images:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new(
                        Doubles {
                            images: $images,
                            ..Doubles::default()
                        }
                        .into_state(),
                    ))
                    .route("/media/{reference:.*}", web::get().to(image)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn serves_stored_images_with_their_type() {
        let mut images = MockImageStore::new();
        images
            .expect_load()
            .withf(|image| image.as_str() == "posts/cat.gif")
            .returning(|_| Ok(Some(SMALL_GIF.to_vec())));
        let app = media_app!(images);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/media/posts/cat.gif").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("image/gif")
        );
        assert_eq!(actix_test::read_body(res).await.as_ref(), SMALL_GIF);
    }

    #[rstest]
    #[case(Ok(None), StatusCode::NOT_FOUND)]
    #[case(Err(ImageStoreError::io("disk gone")), StatusCode::INTERNAL_SERVER_ERROR)]
    #[actix_web::test]
    async fn missing_or_unreadable_images_fail(
        #[case] loaded: Result<Option<Vec<u8>>, ImageStoreError>,
        #[case] status: StatusCode,
    ) {
        let mut images = MockImageStore::new();
        images.expect_load().return_once(move |_| loaded);
        let app = media_app!(images);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/media/posts/gone.gif").to_request(),
        )
        .await;
        assert_eq!(res.status(), status);
    }
}
