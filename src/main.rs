mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{Config, SecretSource, StorageBackend};
use crate::core::middleware;
use crate::features::captioner::GeminiCaptioner;
use crate::features::gallery::{routes as gallery_routes, GalleryService, GalleryState, UploadService};
use crate::modules::gemini::GeminiClient;
use crate::modules::google_auth::{GoogleTokenManager, ServiceAccountKey};
use crate::modules::secrets::{EnvSecretProvider, SecretManagerClient, SecretProvider};
use crate::modules::storage::{GcsClient, ObjectStorage, S3Client, GCS_READ_WRITE_SCOPE};
use crate::shared::templates::TemplateEngine;
use axum::Router;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    // Secrets are read once at startup
    let secrets: Box<dyn SecretProvider> = match config.secrets.source {
        SecretSource::SecretManager => {
            let project_id = config
                .secrets
                .project_id
                .clone()
                .ok_or_else(|| anyhow::anyhow!("GCP_PROJECT_ID is not set"))?;
            let metadata_tokens = Arc::new(GoogleTokenManager::metadata_server(
                config.secrets.metadata_server_url.clone(),
            ));
            tracing::info!("Reading secrets from Secret Manager (project: {})", project_id);
            Box::new(SecretManagerClient::new(
                &config.secrets.secret_manager_url,
                project_id,
                metadata_tokens,
            ))
        }
        SecretSource::Env => {
            tracing::info!("Reading secrets from environment variables");
            Box::new(EnvSecretProvider)
        }
    };

    let gemini_api_key = secrets
        .access_secret(&config.secrets.gemini_api_key_secret)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read Gemini API key: {}", e))?;

    // Initialize object storage
    let storage: Arc<dyn ObjectStorage> = match config.storage.backend {
        StorageBackend::Gcs => {
            let key_json = secrets
                .access_secret(&config.secrets.service_account_key_secret)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read service account key: {}", e))?;
            let key = ServiceAccountKey::from_json(&key_json)
                .map_err(|e| anyhow::anyhow!("Failed to parse service account key: {}", e))?;
            tracing::info!("Using service account {}", key.client_email);

            let token_manager = Arc::new(GoogleTokenManager::service_account(
                key,
                GCS_READ_WRITE_SCOPE,
            ));
            Arc::new(GcsClient::new(
                &config.storage.gcs_base_url,
                config.storage.bucket.clone(),
                token_manager,
            ))
        }
        StorageBackend::S3 => Arc::new(
            S3Client::new(config.storage.s3.clone(), &config.storage.bucket)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to initialize S3 client: {}", e))?,
        ),
    };
    tracing::info!("Storage initialized for bucket: {}", storage.bucket_name());

    // Initialize captioner
    let gemini_client = GeminiClient::new(&config.gemini, gemini_api_key);
    tracing::info!("Gemini client initialized (model: {})", gemini_client.model());
    let captioner = Arc::new(GeminiCaptioner::new(gemini_client));

    // Initialize templates
    let templates = match &config.app.template_dir {
        Some(dir) => TemplateEngine::with_overrides(dir),
        None => TemplateEngine::embedded(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load templates: {}", e))?;
    tracing::info!("Templates loaded: {:?}", templates.template_names());

    let files_root = config.app.files_root.clone();
    tokio::fs::create_dir_all(&files_root)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", files_root.display(), e))?;

    let gallery_state = GalleryState {
        gallery: Arc::new(GalleryService::new(Arc::clone(&storage), files_root.clone())),
        uploads: Arc::new(UploadService::new(
            Arc::clone(&storage),
            captioner,
            files_root.clone(),
        )),
        templates: Arc::new(templates),
        files_root: Arc::new(files_root),
    };
    tracing::info!("Gallery services initialized");

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(gallery_routes(gallery_state, config.app.max_upload_size))
        .merge(health_route)
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;
    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
