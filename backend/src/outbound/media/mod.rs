//! Image storage adapters.
//!
//! Both stores keep files under [`POST_IMAGE_DIR`] and never overwrite: a
//! name that is taken gains a random seven character suffix before the
//! extension.

mod filesystem;
mod memory;

use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::domain::image::split_extension;
use crate::domain::{ImageRef, POST_IMAGE_DIR};

pub use self::filesystem::FilesystemImageStore;
pub use self::memory::InMemoryImageStore;

const SUFFIX_LEN: usize = 7;
const MAX_ATTEMPTS: usize = 16;

/// `cat.png` becomes `cat_Ab3dE9x.png`.
fn with_random_suffix(filename: &str) -> String {
    let (stem, extension) = split_extension(filename);
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{stem}_{suffix}{extension}")
}

/// Filename inside the post directory, or `None` for anything else.
fn stored_filename(image: &ImageRef) -> Option<&str> {
    let name = image
        .as_str()
        .strip_prefix(POST_IMAGE_DIR)?
        .strip_prefix('/')?;
    let safe = !name.is_empty() && !name.contains(['/', '\\']) && !name.starts_with('.');
    safe.then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn suffix_goes_before_the_extension() {
        let renamed = with_random_suffix("cat.png");
        assert!(renamed.starts_with("cat_"));
        assert!(renamed.ends_with(".png"));
        assert_eq!(renamed.len(), "cat_.png".len() + SUFFIX_LEN);
    }

    #[rstest]
    #[case("posts/cat.png", Some("cat.png"))]
    #[case("posts/../secret", None)]
    #[case("posts/nested/cat.png", None)]
    #[case("other/cat.png", None)]
    #[case("posts/", None)]
    fn only_post_images_are_addressable(#[case] raw: &str, #[case] expected: Option<&str>) {
        let image = ImageRef::from_stored(raw.to_owned());
        assert_eq!(stored_filename(&image), expected);
    }
}
