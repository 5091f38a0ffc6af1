//! Image store kept in memory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{MAX_ATTEMPTS, stored_filename, with_random_suffix};
use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{ImageRef, ImageUpload};

/// [`ImageStore`] for tests and database-less development runs.
#[derive(Clone, Default)]
pub struct InMemoryImageStore {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryImageStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.lock().map_or(0, |files| files.len())
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn save(&self, upload: &ImageUpload) -> Result<ImageRef, ImageStoreError> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| ImageStoreError::io("image map poisoned"))?;
        let mut candidate = upload.filename().to_owned();
        for _ in 0..MAX_ATTEMPTS {
            if !files.contains_key(&candidate) {
                files.insert(candidate.clone(), upload.bytes().to_vec());
                return Ok(ImageRef::in_posts_dir(&candidate));
            }
            candidate = with_random_suffix(upload.filename());
        }
        Err(ImageStoreError::io(format!(
            "no free name for {}",
            upload.filename()
        )))
    }

    async fn load(&self, image: &ImageRef) -> Result<Option<Vec<u8>>, ImageStoreError> {
        let Some(filename) = stored_filename(image) else {
            return Ok(None);
        };
        let files = self
            .files
            .lock()
            .map_err(|_| ImageStoreError::io("image map poisoned"))?;
        Ok(files.get(filename).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SMALL_GIF;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn clashing_names_are_kept_apart() {
        let store = InMemoryImageStore::new();
        let upload = ImageUpload::new("dog.gif", SMALL_GIF.to_vec()).expect("valid image");
        let first = store.save(&upload).await.expect("saved");
        let second = store.save(&upload).await.expect("saved");
        assert_eq!(first.as_str(), "posts/dog.gif");
        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
        assert_eq!(store.load(&second).await.expect("loaded"), Some(SMALL_GIF.to_vec()));
    }
}
