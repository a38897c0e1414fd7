use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub secrets: SecretsConfig,
    pub storage: StorageConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_size: usize,
    /// Root of the local `files/` tree shared by uploads, listing and serving
    pub files_root: PathBuf,
    /// Optional directory whose templates override the embedded ones
    pub template_dir: Option<PathBuf>,
}

/// Where process-start credentials come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// Google Secret Manager, authenticated through the metadata server
    SecretManager,
    /// Environment variables named after the secrets (local development)
    Env,
}

#[derive(Debug, Clone)]
pub struct SecretsConfig {
    pub source: SecretSource,
    pub project_id: Option<String>,
    pub service_account_key_secret: String,
    pub gemini_api_key_secret: String,
    pub secret_manager_url: String,
    pub metadata_server_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Gcs,
    S3,
}

/// Object storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Bucket holding images and sidecar files
    pub bucket: String,
    /// GCS JSON API base URL
    pub gcs_base_url: String,
    pub s3: S3Config,
}

/// S3-compatible endpoint settings (MinIO, GCS interoperability mode)
#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub model: String,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            secrets: SecretsConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            gemini: GeminiConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let max_upload_size = env::var("MAX_UPLOAD_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_UPLOAD_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_UPLOAD_SIZE must be a valid number".to_string())?;

        let files_root = PathBuf::from(env::var("FILES_ROOT").unwrap_or_else(|_| "files".into()));

        let template_dir = env::var("TEMPLATE_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            max_upload_size,
            files_root,
            template_dir,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SecretsConfig {
    pub fn from_env() -> Result<Self, String> {
        let source = match env::var("SECRET_SOURCE")
            .unwrap_or_else(|_| "secret-manager".to_string())
            .to_lowercase()
            .as_str()
        {
            "secret-manager" | "secretmanager" | "gcp" => SecretSource::SecretManager,
            "env" => SecretSource::Env,
            other => {
                return Err(format!(
                    "Invalid SECRET_SOURCE '{}': expected 'secret-manager' or 'env'",
                    other
                ))
            }
        };

        let project_id = env::var("GCP_PROJECT_ID").ok().filter(|s| !s.is_empty());
        if source == SecretSource::SecretManager && project_id.is_none() {
            return Err("GCP_PROJECT_ID is required when SECRET_SOURCE=secret-manager".to_string());
        }

        let service_account_key_secret =
            env::var("SERVICE_ACCOUNT_KEY_SECRET").unwrap_or_else(|_| "sakey".to_string());
        let gemini_api_key_secret =
            env::var("GEMINI_API_KEY_SECRET").unwrap_or_else(|_| "geminiApi".to_string());

        let secret_manager_url = env::var("SECRET_MANAGER_URL")
            .unwrap_or_else(|_| "https://secretmanager.googleapis.com".to_string());
        let metadata_server_url = env::var("METADATA_SERVER_URL")
            .unwrap_or_else(|_| "http://metadata.google.internal".to_string());

        Ok(Self {
            source,
            project_id,
            service_account_key_secret,
            gemini_api_key_secret,
            secret_manager_url,
            metadata_server_url,
        })
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let backend = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "gcs".to_string())
            .to_lowercase()
            .as_str()
        {
            "gcs" => StorageBackend::Gcs,
            "s3" | "minio" => StorageBackend::S3,
            other => {
                return Err(format!(
                    "Invalid STORAGE_BACKEND '{}': expected 'gcs' or 's3'",
                    other
                ))
            }
        };

        let bucket = env::var("STORAGE_BUCKET").unwrap_or_else(|_| "picart0".to_string());

        let gcs_base_url = env::var("GCS_BASE_URL")
            .unwrap_or_else(|_| "https://storage.googleapis.com".to_string());

        Ok(Self {
            backend,
            bucket,
            gcs_base_url,
            s3: S3Config::from_env(),
        })
    }
}

impl S3Config {
    pub fn from_env() -> Self {
        Self {
            endpoint: env::var("S3_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),
            region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            access_key: env::var("S3_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            secret_key: env::var("S3_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
        }
    }
}

impl GeminiConfig {
    pub fn from_env() -> Result<Self, String> {
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());
        let base_url = env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string())
            .trim_end_matches('/')
            .to_string();

        if model.is_empty() {
            return Err("GEMINI_MODEL must not be empty".to_string());
        }

        Ok(Self { model, base_url })
    }
}
