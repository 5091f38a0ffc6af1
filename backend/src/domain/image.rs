//! Image attachments for posts.
//!
//! Uploads are accepted on their content, not their name or declared type:
//! the format is guessed from the leading bytes and the whole file must then
//! decode as that format.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Directory, relative to the media root, holding post images.
pub const POST_IMAGE_DIR: &str = "posts";

const MAX_FILENAME_LEN: usize = 100;

/// Raster formats accepted for post images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// GIF87a / GIF89a.
    Gif,
    /// Portable Network Graphics.
    Png,
    /// JPEG / JFIF.
    Jpeg,
    /// RIFF WebP.
    Webp,
    /// Windows bitmap.
    Bmp,
}

impl ImageFormat {
    /// Identify a supported format from the leading bytes.
    ///
    /// This only reads the signature; use [`ImageFormat::decode`] to check the
    /// rest of the file.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        image::guess_format(bytes).ok().and_then(Self::from_codec)
    }

    /// Identify the format and decode the whole file with it.
    ///
    /// # Errors
    ///
    /// [`ImageValidationError::NotAnImage`] when the signature is unknown or
    /// the content does not decode.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageValidationError> {
        let format = Self::sniff(bytes).ok_or(ImageValidationError::NotAnImage)?;
        image::load_from_memory_with_format(bytes, format.codec()).map_err(|err| {
            debug!(error = %err, ?format, "image failed to decode");
            ImageValidationError::NotAnImage
        })?;
        Ok(format)
    }

    const fn from_codec(codec: image::ImageFormat) -> Option<Self> {
        match codec {
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::WebP => Some(Self::Webp),
            image::ImageFormat::Bmp => Some(Self::Bmp),
            _ => None,
        }
    }

    const fn codec(self) -> image::ImageFormat {
        match self {
            Self::Gif => image::ImageFormat::Gif,
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Webp => image::ImageFormat::WebP,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }

    /// Canonical MIME type.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Gif => "image/gif",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Bmp => "image/bmp",
        }
    }
}

/// Reasons an upload is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageValidationError {
    /// The file part had no usable name.
    #[error("The submitted file has no name.")]
    MissingFilename,
    /// The file part was empty.
    #[error("The submitted file is empty.")]
    Empty,
    /// The bytes are not a supported image.
    #[error(
        "Upload a valid image. The file you uploaded was either not an image or a corrupted image."
    )]
    NotAnImage,
}

/// An image file as received from a client, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    filename: String,
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate an uploaded file.
    ///
    /// The client's filename is reduced to a safe basename; the content must
    /// decode as a supported image.
    pub fn new(filename: &str, bytes: Vec<u8>) -> Result<Self, ImageValidationError> {
        let safe = sanitize_filename(filename);
        if safe.is_empty() {
            return Err(ImageValidationError::MissingFilename);
        }
        if bytes.is_empty() {
            return Err(ImageValidationError::Empty);
        }
        let format = ImageFormat::decode(&bytes)?;
        Ok(Self {
            filename: safe,
            format,
            bytes,
        })
    }

    /// Sanitized filename.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Detected format.
    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        self.format
    }

    /// File content.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Directory components are dropped, whitespace becomes `_`, characters other
/// than word characters, `-` and `.` are removed, and the stem is shortened
/// so the whole name fits the storage column.
#[must_use]
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    let cleaned: String = base
        .chars()
        .filter_map(|ch| {
            if ch.is_whitespace() {
                Some('_')
            } else if ch.is_alphanumeric() || ch == '_' || ch == '-' || ch == '.' {
                Some(ch)
            } else {
                None
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.chars().count() <= MAX_FILENAME_LEN {
        return trimmed.to_owned();
    }
    let (stem, extension) = split_extension(trimmed);
    let room = MAX_FILENAME_LEN.saturating_sub(extension.chars().count());
    let short_stem: String = stem.chars().take(room).collect();
    format!("{short_stem}{extension}")
}

/// Split `name` into stem and extension (the extension keeps its dot).
pub(crate) fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(index) if index > 0 => name.split_at(index),
        _ => (name, ""),
    }
}

/// Storage reference to a saved image, e.g. `posts/cat.png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Reference for `filename` inside the post image directory.
    #[must_use]
    pub fn in_posts_dir(filename: &str) -> Self {
        Self(format!("{POST_IMAGE_DIR}/{filename}"))
    }

    /// Adopt a reference read back from storage.
    #[must_use]
    pub const fn from_stored(path: String) -> Self {
        Self(path)
    }

    /// Path relative to the media root.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path component.
    #[must_use]
    pub fn filename(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SMALL_GIF;
    use rstest::rstest;

    #[rstest]
    #[case(SMALL_GIF, Some(ImageFormat::Gif))]
    #[case(b"\x89PNG\r\n\x1a\n\x00\x00", Some(ImageFormat::Png))]
    #[case(&[0xFF, 0xD8, 0xFF, 0xE0], Some(ImageFormat::Jpeg))]
    #[case(b"RIFF\x00\x00\x00\x00WEBPVP8 ", Some(ImageFormat::Webp))]
    #[case(b"hello world", None)]
    #[case(b"", None)]
    fn sniffs_formats(#[case] bytes: &[u8], #[case] expected: Option<ImageFormat>) {
        assert_eq!(ImageFormat::sniff(bytes), expected);
    }

    #[rstest]
    fn decodes_a_real_gif() {
        assert_eq!(ImageFormat::decode(SMALL_GIF), Ok(ImageFormat::Gif));
    }

    #[rstest]
    #[case(b"GIF89a this is not an image at all".as_slice())]
    #[case(b"\x89PNG\r\n\x1a\n truncated".as_slice())]
    #[case(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])]
    fn signature_alone_is_not_enough(#[case] bytes: &[u8]) {
        assert_eq!(
            ImageUpload::new("cat.gif", bytes.to_vec()),
            Err(ImageValidationError::NotAnImage)
        );
    }

    #[rstest]
    fn accepts_gif_named_png() {
        let upload = ImageUpload::new("image.png", SMALL_GIF.to_vec()).expect("valid image");
        assert_eq!(upload.filename(), "image.png");
        assert_eq!(upload.format(), ImageFormat::Gif);
    }

    #[rstest]
    #[case("notes.txt", b"plain text".to_vec(), ImageValidationError::NotAnImage)]
    #[case("empty.png", Vec::new(), ImageValidationError::Empty)]
    #[case("", SMALL_GIF.to_vec(), ImageValidationError::MissingFilename)]
    fn rejects_bad_uploads(
        #[case] name: &str,
        #[case] bytes: Vec<u8>,
        #[case] expected: ImageValidationError,
    ) {
        assert_eq!(ImageUpload::new(name, bytes), Err(expected));
    }

    #[rstest]
    #[case("../../etc/passwd", "passwd")]
    #[case("C:\\photos\\my cat.jpg", "my_cat.jpg")]
    #[case("we<ird>na*me?.gif", "weirdname.gif")]
    #[case("...hidden.png", "hidden.png")]
    fn sanitizes_filenames(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(sanitize_filename(raw), expected);
    }

    #[rstest]
    fn long_names_keep_their_extension() {
        let name = format!("{}.png", "x".repeat(300));
        let safe = sanitize_filename(&name);
        assert_eq!(safe.chars().count(), MAX_FILENAME_LEN);
        assert!(safe.ends_with(".png"));
    }

    #[rstest]
    fn references_live_in_the_posts_directory() {
        let image = ImageRef::in_posts_dir("cat.gif");
        assert_eq!(image.as_str(), "posts/cat.gif");
        assert_eq!(image.filename(), "cat.gif");
    }
}
