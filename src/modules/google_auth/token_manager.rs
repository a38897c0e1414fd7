use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::{ServiceAccountKey, TokenError};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Response from the Google OAuth2 token endpoint (and the metadata server)
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(rename = "token_type", default)]
    pub _token_type: String,
}

/// How access tokens are minted
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// Sign a JWT with the service-account key and exchange it at `token_uri`
    ServiceAccount {
        key: ServiceAccountKey,
        scope: String,
    },
    /// Ask the GCE / Cloud Run metadata server for the attached identity's token
    MetadataServer { base_url: String },
}

/// Cached token with expiration tracking
struct TokenCache {
    token: TokenResponse,
    fetched_at: Instant,
}

/// Manages Google OAuth2 access tokens with caching
pub struct GoogleTokenManager {
    source: TokenSource,
    client: reqwest::Client,
    cache: Arc<RwLock<Option<TokenCache>>>,
    /// Refresh token this many seconds before expiration
    refresh_margin: Duration,
}

impl GoogleTokenManager {
    pub fn new(source: TokenSource) -> Self {
        Self {
            source,
            client: reqwest::Client::new(),
            cache: Arc::new(RwLock::new(None)),
            refresh_margin: Duration::from_secs(60),
        }
    }

    pub fn service_account(key: ServiceAccountKey, scope: impl Into<String>) -> Self {
        Self::new(TokenSource::ServiceAccount {
            key,
            scope: scope.into(),
        })
    }

    pub fn metadata_server(base_url: impl Into<String>) -> Self {
        Self::new(TokenSource::MetadataServer {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Get a valid access token, fetching a new one if necessary
    pub async fn get_access_token(&self) -> Result<String, TokenError> {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                let elapsed = cached.fetched_at.elapsed();
                let expires_in = Duration::from_secs(cached.token.expires_in);

                if elapsed + self.refresh_margin < expires_in {
                    tracing::debug!(
                        "Using cached Google access token (expires in {} seconds)",
                        (expires_in - elapsed).as_secs()
                    );
                    return Ok(cached.token.access_token.clone());
                }
            }
        }

        let token = self.fetch_token().await?;
        let access_token = token.access_token.clone();

        let mut cache = self.cache.write().await;
        *cache = Some(TokenCache {
            token,
            fetched_at: Instant::now(),
        });

        Ok(access_token)
    }

    async fn fetch_token(&self) -> Result<TokenResponse, TokenError> {
        let response = match &self.source {
            TokenSource::ServiceAccount { key, scope } => {
                tracing::debug!(
                    "Exchanging service account assertion for {} at {}",
                    key.client_email,
                    key.token_uri
                );
                let assertion = key.signed_assertion(scope)?;
                self.client
                    .post(&key.token_uri)
                    .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
                    .send()
                    .await
            }
            TokenSource::MetadataServer { base_url } => {
                let url = format!(
                    "{}/computeMetadata/v1/instance/service-accounts/default/token",
                    base_url
                );
                tracing::debug!("Fetching access token from metadata server {}", url);
                self.client
                    .get(&url)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await
            }
        }
        .map_err(|e| TokenError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TokenError::FetchError(format!(
                "Token request failed: HTTP {} - {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| TokenError::ParseError(e.to_string()))?;

        tracing::info!(
            "Fetched new Google access token, expires in {} seconds",
            token_response.expires_in
        );

        Ok(token_response)
    }
}
