use async_trait::async_trait;
use base64::prelude::*;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;

use super::{SecretError, SecretProvider};
use crate::modules::google_auth::GoogleTokenManager;

#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse {
    payload: SecretPayload,
}

#[derive(Debug, Deserialize)]
struct SecretPayload {
    /// Base64-encoded secret bytes
    data: String,
}

/// Google Secret Manager client (REST, `versions/latest:access`)
pub struct SecretManagerClient {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    token_manager: Arc<GoogleTokenManager>,
}

impl SecretManagerClient {
    pub fn new(
        base_url: &str,
        project_id: impl Into<String>,
        token_manager: Arc<GoogleTokenManager>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            token_manager,
        }
    }

    fn version_url(&self, name: &str) -> String {
        format!(
            "{}/v1/projects/{}/secrets/{}/versions/latest:access",
            self.base_url, self.project_id, name
        )
    }
}

#[async_trait]
impl SecretProvider for SecretManagerClient {
    async fn access_secret(&self, name: &str) -> Result<String, SecretError> {
        let access_error = |message: String| SecretError::Access {
            name: name.to_string(),
            message,
        };

        let token = self
            .token_manager
            .get_access_token()
            .await
            .map_err(|e| access_error(e.to_string()))?;

        let response = self
            .client
            .get(self.version_url(name))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| access_error(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(SecretError::NotFound(name.to_string())),
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(access_error(format!("HTTP {} - {}", status, body)));
            }
        }

        let version: AccessSecretVersionResponse = response
            .json()
            .await
            .map_err(|e| access_error(format!("Invalid response: {}", e)))?;

        let bytes = BASE64_STANDARD
            .decode(version.payload.data.as_bytes())
            .map_err(|e| access_error(format!("Invalid payload encoding: {}", e)))?;

        tracing::info!("Loaded secret '{}' from Secret Manager", name);

        String::from_utf8(bytes).map_err(|_| SecretError::InvalidPayload(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> SecretManagerClient {
        Mock::given(method("GET"))
            .and(path(
                "/computeMetadata/v1/instance/service-accounts/default/token",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "meta-token",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .mount(server)
            .await;

        let tokens = Arc::new(GoogleTokenManager::metadata_server(server.uri()));
        SecretManagerClient::new(&server.uri(), "picart-test", tokens)
    }

    #[tokio::test]
    async fn test_access_secret_decodes_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/v1/projects/picart-test/secrets/geminiApi/versions/latest:access",
            ))
            .and(header("authorization", "Bearer meta-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "projects/1/secrets/geminiApi/versions/3",
                "payload": { "data": BASE64_STANDARD.encode("gemini-key-123") }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let value = client.access_secret("geminiApi").await.unwrap();
        assert_eq!(value, "gemini-key-123");
    }

    #[tokio::test]
    async fn test_access_secret_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/v1/projects/picart-test/secrets/missing/versions/latest:access",
            ))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result = client.access_secret("missing").await;
        assert!(matches!(result, Err(SecretError::NotFound(ref n)) if n == "missing"));
    }

    #[tokio::test]
    async fn test_access_secret_permission_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/projects/picart-test/secrets/sakey/versions/latest:access"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result = client.access_secret("sakey").await;
        assert!(matches!(result, Err(SecretError::Access { .. })));
    }
}
