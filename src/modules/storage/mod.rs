//! Storage module for gallery objects
//!
//! One bucket holds both images and their sidecar text files. Two backends
//! implement [`ObjectStorage`]: the GCS JSON API and any S3-compatible
//! endpoint.

mod gcs_client;
mod s3_client;

pub use gcs_client::{GcsClient, GCS_READ_WRITE_SCOPE};
pub use s3_client::S3Client;

use async_trait::async_trait;

use crate::core::error::AppError;

/// An object in the bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Full object name, e.g. `default_user/cat.jpg`
    pub name: String,
    pub size: Option<u64>,
}

/// Authenticated handle to a single bucket
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// List every object in the bucket, in the backend's listing order
    async fn list_objects(&self) -> Result<Vec<ObjectInfo>, AppError>;

    /// Store `data` under `key`, replacing any existing object
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    fn bucket_name(&self) -> &str;
}
