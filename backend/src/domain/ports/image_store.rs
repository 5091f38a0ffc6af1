//! Port for storing uploaded images.
use async_trait::async_trait;

use crate::domain::{ImageRef, ImageUpload};

use super::define_port_error;

define_port_error! {
    /// Errors raised by image storage adapters.
    pub enum ImageStoreError {
        /// Writing the file failed.
        Io { message: String } => InternalError: "image storage failed: {message}",
    }
}

/// Persists image uploads and hands back their references.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Save `upload` under the post image directory.
    ///
    /// An existing file with the same name is never overwritten; the stored
    /// name gains a suffix instead.
    async fn save(&self, upload: &ImageUpload) -> Result<ImageRef, ImageStoreError>;

    /// Read a stored image back; `None` when nothing is stored under `image`.
    async fn load(&self, image: &ImageRef) -> Result<Option<Vec<u8>>, ImageStoreError>;
}
