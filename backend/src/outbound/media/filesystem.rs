//! Image store rooted at a media directory on disk.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{
    ambient_authority,
    fs::{Dir, OpenOptions},
};
use tracing::info;

use super::{MAX_ATTEMPTS, stored_filename, with_random_suffix};
use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{ImageRef, ImageUpload, POST_IMAGE_DIR};

/// [`ImageStore`] writing through a `cap_std` directory handle.
#[derive(Clone)]
pub struct FilesystemImageStore {
    posts: Arc<Dir>,
    root: PathBuf,
}

impl FilesystemImageStore {
    /// Open `root`, creating it and its post directory when missing.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        let posts_path = root.join(POST_IMAGE_DIR);
        Dir::create_ambient_dir_all(&posts_path, ambient_authority())?;
        let posts = Dir::open_ambient_dir(&posts_path, ambient_authority())?;
        Ok(Self {
            posts: Arc::new(posts),
            root,
        })
    }

    /// Media root on disk.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn write_unique(dir: &Dir, filename: &str, bytes: &[u8]) -> io::Result<String> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut candidate = filename.to_owned();
    for _ in 0..MAX_ATTEMPTS {
        match dir.open_with(&candidate, &options) {
            Ok(mut file) => {
                file.write_all(bytes)?;
                file.flush()?;
                return Ok(candidate);
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                candidate = with_random_suffix(filename);
            }
            Err(err) => return Err(err),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free name for {filename}"),
    ))
}

fn io_error(err: impl ToString) -> ImageStoreError {
    ImageStoreError::io(err.to_string())
}

#[async_trait]
impl ImageStore for FilesystemImageStore {
    async fn save(&self, upload: &ImageUpload) -> Result<ImageRef, ImageStoreError> {
        let dir = Arc::clone(&self.posts);
        let filename = upload.filename().to_owned();
        let bytes = upload.bytes().to_vec();
        let stored = tokio::task::spawn_blocking(move || write_unique(&dir, &filename, &bytes))
            .await
            .map_err(io_error)?
            .map_err(io_error)?;
        info!(filename = %stored, "stored post image");
        Ok(ImageRef::in_posts_dir(&stored))
    }

    async fn load(&self, image: &ImageRef) -> Result<Option<Vec<u8>>, ImageStoreError> {
        let Some(filename) = stored_filename(image).map(str::to_owned) else {
            return Ok(None);
        };
        let dir = Arc::clone(&self.posts);
        let read = tokio::task::spawn_blocking(move || dir.read(&filename))
            .await
            .map_err(io_error)?;
        match read {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(err)),
        }
    }
}
