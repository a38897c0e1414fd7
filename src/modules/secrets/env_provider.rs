use async_trait::async_trait;

use super::{SecretError, SecretProvider};

/// Reads each secret from the environment variable of the same name.
///
/// Meant for local development, where `.env` stands in for Secret Manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretProvider;

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn access_secret(&self, name: &str) -> Result<String, SecretError> {
        match std::env::var(name) {
            Ok(value) if !value.is_empty() => Ok(value),
            Ok(_) | Err(std::env::VarError::NotPresent) => {
                Err(SecretError::NotFound(name.to_string()))
            }
            Err(std::env::VarError::NotUnicode(_)) => {
                Err(SecretError::InvalidPayload(name.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_variable_is_not_found() {
        let result = EnvSecretProvider
            .access_secret("PICART_TEST_SECRET_THAT_IS_NEVER_SET")
            .await;
        assert!(matches!(result, Err(SecretError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reads_present_variable() {
        // PATH is set in every test environment
        let value = EnvSecretProvider.access_secret("PATH").await.unwrap();
        assert!(!value.is_empty());
    }
}
