use reqwest::Client;
use tracing::{debug, info};

use super::types::{
    GenerateContentRequest, GenerateContentResponse, UploadFileResponse, UploadedFile,
};
use super::GeminiError;
use crate::core::config::GeminiConfig;

/// Thin REST client for the Gemini API (Files API + generateContent)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Upload bytes to the Files API using the resumable protocol.
    ///
    /// 1. `start` request announces size and type, returns an upload URL.
    /// 2. `upload, finalize` sends the bytes and returns the file resource.
    pub async fn upload_file(
        &self,
        data: Vec<u8>,
        mime_type: &str,
        display_name: &str,
    ) -> Result<UploadedFile, GeminiError> {
        let num_bytes = data.len();
        let init_url = format!("{}/upload/v1beta/files", self.base_url);

        let init_response = self
            .client
            .post(&init_url)
            .query(&[("key", self.api_key.as_str())])
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", num_bytes.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&serde_json::json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;

        if !init_response.status().is_success() {
            let status = init_response.status();
            let body = init_response.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let upload_url = init_response
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .ok_or(GeminiError::MissingUploadUrl)?
            .to_string();

        let upload_response = self
            .client
            .post(&upload_url)
            .header("Content-Length", num_bytes.to_string())
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(data)
            .send()
            .await?;

        if !upload_response.status().is_success() {
            let status = upload_response.status();
            let body = upload_response.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let uploaded: UploadFileResponse = upload_response
            .json()
            .await
            .map_err(|e| GeminiError::InvalidResponse(e.to_string()))?;

        info!(
            "Uploaded file '{}' as: {}",
            uploaded.file.display_name.as_deref().unwrap_or(display_name),
            uploaded.file.uri
        );

        Ok(uploaded.file)
    }

    /// Run `generateContent` and return the reply text of the first candidate
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<String, GeminiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        debug!("Sending generateContent request to model {}", self.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::InvalidResponse(e.to_string()))?;

        parsed.text().ok_or(GeminiError::EmptyResponse)
    }
}
