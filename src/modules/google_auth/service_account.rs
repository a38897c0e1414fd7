use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use super::TokenError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Lifetime requested for the signed assertion (Google caps this at one hour)
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Google service-account key, as downloaded from IAM or stored in Secret Manager
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("project_id", &self.project_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

impl ServiceAccountKey {
    /// Parse the JSON key file contents
    pub fn from_json(json: &str) -> Result<Self, TokenError> {
        serde_json::from_str(json)
            .map_err(|e| TokenError::InvalidKey(format!("Malformed service account key: {}", e)))
    }

    /// Build the RS256-signed JWT used in the `jwt-bearer` grant
    pub fn signed_assertion(&self, scope: &str) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: scope.to_string(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| TokenError::InvalidKey(format!("Invalid private key: {}", e)))?;

        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| TokenError::InvalidKey(format!("Failed to sign assertion: {}", e)))
    }
}
