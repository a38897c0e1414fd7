use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::core::error::Result;
use crate::features::gallery::models::{sidecar_name, ImageRecord, Sidecar, SidecarError};
use crate::modules::storage::ObjectStorage;
use crate::shared::images::is_allowed_image;

/// Builds the gallery listing from bucket contents
///
/// Image objects come from the bucket, but captions are read from the local
/// sidecar files written by [`super::UploadService`]. Only the instance that
/// handled an upload can list it.
pub struct GalleryService {
    storage: Arc<dyn ObjectStorage>,
    files_root: PathBuf,
}

impl GalleryService {
    pub fn new(storage: Arc<dyn ObjectStorage>, files_root: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            files_root: files_root.into(),
        }
    }

    /// Every image in the bucket with its caption, in listing order.
    /// A missing or incomplete sidecar fails the whole listing.
    pub async fn list_images(&self) -> Result<Vec<ImageRecord>> {
        let objects = self.storage.list_objects().await?;

        let mut images = Vec::new();
        let mut total_bytes = 0u64;
        for object in objects.into_iter().filter(|o| is_allowed_image(&o.name)) {
            let sidecar = self.read_sidecar(&sidecar_name(&object.name)).await?;
            total_bytes += object.size.unwrap_or(0);
            images.push(ImageRecord::from_sidecar(object.name, sidecar));
        }

        debug!(
            "Listed {} images ({} bytes) from bucket {}",
            images.len(),
            total_bytes,
            self.storage.bucket_name()
        );
        Ok(images)
    }

    async fn read_sidecar(&self, name: &str) -> std::result::Result<Sidecar, SidecarError> {
        let contents = tokio::fs::read_to_string(self.files_root.join(name))
            .await
            .map_err(|source| SidecarError::Missing {
                name: name.to_string(),
                source,
            })?;
        Sidecar::parse(name, &contents)
    }
}
