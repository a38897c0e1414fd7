//! S3-compatible storage client
//!
//! Works against MinIO for local development and against GCS in
//! interoperability mode (HMAC keys, endpoint `https://storage.googleapis.com`).
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::{ObjectInfo, ObjectStorage};
use crate::core::config::S3Config;
use crate::core::error::AppError;

/// S3-compatible storage client
pub struct S3Client {
    bucket: Box<Bucket>,
    bucket_name: String,
    region: Region,
    credentials: Credentials,
    endpoint: String,
}

impl S3Client {
    /// Create a new client for `bucket_name`, creating the bucket if it doesn't exist
    pub async fn new(config: S3Config, bucket_name: &str) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create S3 credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(bucket_name, region.clone(), credentials.clone())
            .map_err(|e| AppError::Storage(format!("Failed to create S3 bucket handle: {}", e)))?;

        // Path-style URLs (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        let client = Self {
            bucket,
            bucket_name: bucket_name.to_string(),
            region,
            credentials,
            endpoint: config.endpoint,
        };

        client.ensure_bucket_exists().await;

        info!(
            "S3 client initialized for endpoint: {}, bucket: {}",
            client.endpoint, client.bucket_name
        );

        Ok(client)
    }

    /// Create the bucket; an existing bucket is fine
    async fn ensure_bucket_exists(&self) {
        match Bucket::create_with_path_style(
            &self.bucket_name,
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        {
            Ok(response) if response.success() => {
                info!("Bucket '{}' created successfully", self.bucket_name);
            }
            Ok(response) => {
                debug!(
                    "Bucket '{}' not created (HTTP {}), assuming it exists",
                    self.bucket_name, response.response_code
                );
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket_name);
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket_name, e
                    );
                }
            }
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Client {
    async fn list_objects(&self) -> Result<Vec<ObjectInfo>, AppError> {
        let pages = self.bucket.list(String::new(), None).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to list bucket '{}': {}",
                self.bucket_name, e
            ))
        })?;

        let objects: Vec<ObjectInfo> = pages
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|object| ObjectInfo {
                name: object.key,
                size: Some(object.size),
            })
            .collect();

        debug!(
            "Listed {} objects in bucket '{}'",
            objects.len(),
            self.bucket_name
        );
        Ok(objects)
    }

    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file '{}': {}", key, e)))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(AppError::Storage(format!(
                "Failed to upload file '{}': HTTP {}",
                key, status
            )));
        }

        info!("Uploaded object '{}' to bucket '{}'", key, self.bucket_name);
        Ok(())
    }

    fn bucket_name(&self) -> &str {
        &self.bucket_name
    }
}
