//! Google Gemini REST integration

mod client;
mod types;

pub use client::GeminiClient;
pub use types::{
    Content, FileData, GenerateContentRequest, GenerationConfig, Part, Role, UploadedFile,
};

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("Gemini request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("No 'x-goog-upload-url' header in upload response")]
    MissingUploadUrl,

    #[error("Invalid Gemini response: {0}")]
    InvalidResponse(String),

    #[error("No text response received from Gemini")]
    EmptyResponse,
}
