//! Secret retrieval at process start
//!
//! Credentials (service-account key, Gemini API key) are read once in `main`
//! and passed into the clients that need them.

mod env_provider;
mod secret_manager;

pub use env_provider::EnvSecretProvider;
pub use secret_manager::SecretManagerClient;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("Secret '{0}' not found")]
    NotFound(String),

    #[error("Failed to access secret '{name}': {message}")]
    Access { name: String, message: String },

    #[error("Secret '{0}' payload is not valid UTF-8")]
    InvalidPayload(String),
}

/// Source of named secrets
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Fetch the latest value of the named secret
    async fn access_secret(&self, name: &str) -> Result<String, SecretError>;
}
