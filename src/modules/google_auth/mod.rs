//! Google OAuth2 access tokens
//!
//! Service-account keys are exchanged for tokens via the JWT bearer grant;
//! workloads on GCE / Cloud Run can use the metadata server instead.

mod service_account;
mod token_manager;

pub use service_account::ServiceAccountKey;
pub use token_manager::{GoogleTokenManager, TokenSource};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Invalid service account key: {0}")]
    InvalidKey(String),

    #[error("Failed to fetch token: {0}")]
    FetchError(String),

    #[error("Failed to parse token response: {0}")]
    ParseError(String),
}
