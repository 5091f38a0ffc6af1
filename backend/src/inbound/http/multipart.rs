//! Reading post forms from `multipart/form-data` bodies.
//!
//! Fields: `text`, `group` (a slug, blank for none) and `image` (a file).
//! An `image` part with neither a filename nor content is what browsers send
//! when no file was picked, and counts as no image.

use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;
use tracing::debug;

use crate::domain::{Error, ImageUpload, PostDraft};

/// Largest accepted value for any single part.
pub const MAX_PART_BYTES: usize = 10 * 1024 * 1024;

async fn read_field(field: &mut Field, name: &str) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk
            .map_err(|err| Error::invalid_request(format!("malformed multipart body: {err}")))?;
        if bytes.len() + chunk.len() > MAX_PART_BYTES {
            return Err(Error::invalid_request(format!(
                "{name} exceeds {MAX_PART_BYTES} bytes"
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn text_value(name: &str, bytes: Vec<u8>) -> Result<String, Error> {
    String::from_utf8(bytes).map_err(|_| Error::invalid_request(format!("{name} is not UTF-8")))
}

/// Collect a [`PostDraft`] from a form body.
///
/// Unknown parts are drained and ignored. Image content is checked here so
/// that the form can report it alongside the other fields.
///
/// # Errors
///
/// `invalid_request` for a malformed body, non UTF-8 text or an oversized
/// part.
pub async fn read_post_draft(mut payload: Multipart) -> Result<PostDraft, Error> {
    let mut draft = PostDraft::default();
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|err| Error::invalid_request(format!("malformed multipart body: {err}")))?;
        let name = field.name().unwrap_or_default().to_owned();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);
        let bytes = read_field(&mut field, &name).await?;
        match name.as_str() {
            "text" => draft.text = text_value("text", bytes)?,
            "group" => draft.group = Some(text_value("group", bytes)?),
            "image" => {
                let filename = filename.unwrap_or_default();
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                draft.image = Some(ImageUpload::new(&filename, bytes));
            }
            other => debug!(field = other, "ignoring unknown form field"),
        }
    }
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, ImageValidationError};
    use crate::test_support::{FormPart, SMALL_GIF, multipart_body, multipart_content_type};
    use actix_web::http::header::CONTENT_TYPE;
    use actix_web::{App, HttpResponse, test, web};
    use serde_json::{Value, json};

    async fn echo(payload: Multipart) -> Result<HttpResponse, Error> {
        let draft = read_post_draft(payload).await?;
        let image = match draft.image {
            None => json!(null),
            Some(Ok(upload)) => json!({ "filename": upload.filename() }),
            Some(Err(err)) => json!({ "error": err.to_string() }),
        };
        Ok(HttpResponse::Ok().json(json!({
            "text": draft.text,
            "group": draft.group,
            "image": image,
        })))
    }

    async fn submit(parts: &[FormPart<'_>]) -> (u16, Value) {
        let app = test::init_service(App::new().route("/", web::post().to(echo))).await;
        let req = test::TestRequest::post()
            .uri("/")
            .insert_header((CONTENT_TYPE, multipart_content_type()))
            .set_payload(multipart_body(parts))
            .to_request();
        let res = test::call_service(&app, req).await;
        let status = res.status().as_u16();
        (status, test::read_body_json(res).await)
    }

    #[actix_web::test]
    async fn reads_every_field() {
        let (status, body) = submit(&[
            FormPart::Text {
                name: "text",
                value: "hello",
            },
            FormPart::Text {
                name: "group",
                value: "cats",
            },
            FormPart::File {
                name: "image",
                filename: "my cat.gif",
                content_type: "image/gif",
                bytes: SMALL_GIF,
            },
        ])
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["text"], "hello");
        assert_eq!(body["group"], "cats");
        assert_eq!(body["image"]["filename"], "my_cat.gif");
    }

    #[actix_web::test]
    async fn empty_file_parts_mean_no_image() {
        let (_, body) = submit(&[
            FormPart::Text {
                name: "text",
                value: "no picture",
            },
            FormPart::File {
                name: "image",
                filename: "",
                content_type: "application/octet-stream",
                bytes: b"",
            },
        ])
        .await;
        assert_eq!(body["image"], Value::Null);
        assert_eq!(body["group"], Value::Null);
    }

    #[actix_web::test]
    async fn non_images_are_reported_per_field() {
        let (status, body) = submit(&[FormPart::File {
            name: "image",
            filename: "notes.txt",
            content_type: "text/plain",
            bytes: b"just text",
        }])
        .await;
        assert_eq!(status, 200);
        assert_eq!(
            body["image"]["error"],
            ImageValidationError::NotAnImage.to_string()
        );
    }

    #[actix_web::test]
    async fn invalid_utf8_text_is_rejected() {
        let app = test::init_service(App::new().route("/", web::post().to(echo))).await;
        let mut payload = multipart_body(&[FormPart::Text {
            name: "text",
            value: "PLACEHOLDER",
        }]);
        let start = payload
            .windows(11)
            .position(|w| w == b"PLACEHOLDER")
            .expect("placeholder present");
        let _removed: Vec<u8> = payload.splice(start..start + 11, [0xff, 0xfe]).collect();
        let req = test::TestRequest::post()
            .uri("/")
            .insert_header((CONTENT_TYPE, multipart_content_type()))
            .set_payload(payload)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 400);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], serde_json::to_value(ErrorCode::InvalidRequest).expect("code"));
    }
}
