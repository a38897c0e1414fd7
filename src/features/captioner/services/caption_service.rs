use async_trait::async_trait;
use std::path::Path;
use tracing::{info, warn};

use crate::core::error::{AppError, Result};
use crate::features::captioner::models::Caption;
use crate::modules::gemini::{
    Content, GeminiClient, GenerateContentRequest, GenerationConfig, Part, UploadedFile,
};
use crate::shared::images::image_content_type;

const PRIMING_USER_TURN: &str = "Generate title and a description for an image\n";
const PRIMING_MODEL_TURN: &str =
    "Please provide me with the image you want a title and description for!";
const CAPTION_INSTRUCTION: &str = "Generate a title and a description.";

/// Produces a title and description for a locally stored image
#[async_trait]
pub trait Captioner: Send + Sync {
    async fn caption(&self, image_path: &Path) -> Result<Caption>;
}

/// Captioner backed by Gemini: Files API upload, then a primed chat turn
pub struct GeminiCaptioner {
    client: GeminiClient,
}

impl GeminiCaptioner {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    fn generation_config() -> GenerationConfig {
        GenerationConfig {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 8192,
            response_mime_type: Some("application/json".to_string()),
        }
    }

    /// Two priming turns, then the image with the instruction
    fn build_request(file: &UploadedFile) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![
                Content::user(vec![Part::text(PRIMING_USER_TURN)]),
                Content::model(vec![Part::text(PRIMING_MODEL_TURN)]),
                Content::user(vec![Part::file(file), Part::text(CAPTION_INSTRUCTION)]),
            ],
            generation_config: Self::generation_config(),
        }
    }
}

#[async_trait]
impl Captioner for GeminiCaptioner {
    async fn caption(&self, image_path: &Path) -> Result<Caption> {
        let file_name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        let mime_type = image_content_type(&file_name).unwrap_or("image/jpeg");

        let data = tokio::fs::read(image_path).await?;

        let file = self
            .client
            .upload_file(data, mime_type, &file_name)
            .await
            .map_err(|e| AppError::ExternalService(format!("Gemini file upload failed: {}", e)))?;

        let reply = self
            .client
            .generate_content(&Self::build_request(&file))
            .await
            .map_err(|e| AppError::ExternalService(format!("Gemini generation failed: {}", e)))?;

        let caption = Caption::from_reply(&reply);
        match &caption {
            Caption::Generated { title, .. } => {
                info!(
                    "Generated caption for {} with {}: {}",
                    file_name,
                    self.client.model(),
                    title
                );
            }
            Caption::Unparseable { reason } => {
                warn!("Error decoding JSON response for {}: {}", file_name, reason);
            }
        }

        Ok(caption)
    }
}
