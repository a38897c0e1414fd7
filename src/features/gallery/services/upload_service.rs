use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::core::error::{AppError, Result};
use crate::features::captioner::Captioner;
use crate::features::gallery::models::{sidecar_name, ImageRecord, Sidecar};
use crate::modules::storage::ObjectStorage;
use crate::shared::constants::DEFAULT_USER_ID;
use crate::shared::images::{image_content_type, is_allowed_image};

pub const NO_FILE_SELECTED: &str = "No file selected";
pub const INVALID_FILE_FORMAT: &str =
    "Invalid file format. Only .jpg, .jpeg, and .png files are allowed.";

/// Handles an uploaded image: local copy, caption, sidecar, bucket objects
pub struct UploadService {
    storage: Arc<dyn ObjectStorage>,
    captioner: Arc<dyn Captioner>,
    files_root: PathBuf,
}

impl UploadService {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        captioner: Arc<dyn Captioner>,
        files_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            storage,
            captioner,
            files_root: files_root.into(),
        }
    }

    /// Final path component of the client-supplied name, checked against the
    /// allowed image extensions
    pub fn validate_file_name(raw: &str) -> Result<String> {
        let file_name = raw.rsplit(['/', '\\']).next().unwrap_or_default();

        if file_name.is_empty() {
            return Err(AppError::BadRequest(NO_FILE_SELECTED.to_string()));
        }
        if !is_allowed_image(file_name) {
            return Err(AppError::BadRequest(INVALID_FILE_FORMAT.to_string()));
        }

        Ok(file_name.to_string())
    }

    /// Store, caption and publish one image.
    ///
    /// Steps run in order with no rollback; a failure leaves earlier
    /// side effects in place.
    pub async fn upload(&self, raw_file_name: &str, data: Vec<u8>) -> Result<ImageRecord> {
        let file_name = Self::validate_file_name(raw_file_name)?;
        let content_type = image_content_type(&file_name).unwrap_or("application/octet-stream");

        let user_dir = self.files_root.join(DEFAULT_USER_ID);
        tokio::fs::create_dir_all(&user_dir).await?;

        let image_path = user_dir.join(&file_name);
        tokio::fs::write(&image_path, &data).await?;
        info!("Saved {} ({} bytes)", image_path.display(), data.len());

        let caption = self.captioner.caption(&image_path).await?;
        let sidecar = Sidecar::new(caption.title(), caption.description());

        let sidecar_file = sidecar_name(&file_name);
        let contents = sidecar.render();
        tokio::fs::write(user_dir.join(&sidecar_file), &contents).await?;

        let sidecar_key = format!("{}/{}", DEFAULT_USER_ID, sidecar_file);
        self.storage
            .upload(&sidecar_key, contents.into_bytes(), "text/plain")
            .await?;
        info!(
            "Uploaded {} to bucket {}",
            sidecar_key,
            self.storage.bucket_name()
        );

        let image_key = format!("{}/{}", DEFAULT_USER_ID, file_name);
        self.storage.upload(&image_key, data, content_type).await?;
        info!(
            "Uploaded {} to bucket {}",
            image_key,
            self.storage.bucket_name()
        );

        Ok(ImageRecord::from_sidecar(image_key, sidecar))
    }
}
