//! Google Cloud Storage client over the JSON API
//!
//! Authenticates with OAuth2 access tokens minted from the service-account key.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::{ObjectInfo, ObjectStorage};
use crate::core::error::AppError;
use crate::modules::google_auth::GoogleTokenManager;

/// OAuth2 scope needed to list and create objects
pub const GCS_READ_WRITE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListObjectsResponse {
    #[serde(default)]
    items: Vec<GcsObject>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GcsObject {
    name: String,
    /// The JSON API encodes sizes as decimal strings
    size: Option<String>,
}

pub struct GcsClient {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    token_manager: Arc<GoogleTokenManager>,
}

impl GcsClient {
    pub fn new(
        base_url: &str,
        bucket: impl Into<String>,
        token_manager: Arc<GoogleTokenManager>,
    ) -> Self {
        let client = Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            token_manager,
        };

        info!(
            "GCS client initialized for endpoint: {}, bucket: {}",
            client.base_url, client.bucket
        );

        client
    }

    async fn access_token(&self) -> Result<String, AppError> {
        self.token_manager
            .get_access_token()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to authenticate with GCS: {}", e)))
    }

    fn objects_url(&self) -> String {
        format!(
            "{}/storage/v1/b/{}/o",
            self.base_url,
            urlencoding::encode(&self.bucket)
        )
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o",
            self.base_url,
            urlencoding::encode(&self.bucket)
        )
    }
}

#[async_trait]
impl ObjectStorage for GcsClient {
    async fn list_objects(&self) -> Result<Vec<ObjectInfo>, AppError> {
        let token = self.access_token().await?;
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.objects_url())
                .bearer_auth(&token)
                .query(&[("fields", "items(name,size),nextPageToken")]);
            if let Some(ref page) = page_token {
                request = request.query(&[("pageToken", page)]);
            }

            let response = request.send().await.map_err(|e| {
                AppError::Storage(format!("Failed to list bucket '{}': {}", self.bucket, e))
            })?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::Storage(format!(
                    "Failed to list bucket '{}': {} - {}",
                    self.bucket, status, body
                )));
            }

            let page: ListObjectsResponse = response.json().await.map_err(|e| {
                AppError::Storage(format!("Invalid listing for bucket '{}': {}", self.bucket, e))
            })?;

            objects.extend(page.items.into_iter().map(|item| ObjectInfo {
                size: item.size.and_then(|s| s.parse().ok()),
                name: item.name,
            }));

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        debug!(
            "Listed {} objects in bucket '{}'",
            objects.len(),
            self.bucket
        );
        Ok(objects)
    }

    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        let token = self.access_token().await?;

        let response = self
            .client
            .post(self.upload_url())
            .bearer_auth(&token)
            .query(&[("uploadType", "media"), ("name", key)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file '{}': {}", key, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "Failed to upload file '{}': {} - {}",
                key, status, body
            )));
        }

        info!("Uploaded object '{}' to bucket '{}'", key, self.bucket);
        Ok(())
    }

    fn bucket_name(&self) -> &str {
        &self.bucket
    }
}
