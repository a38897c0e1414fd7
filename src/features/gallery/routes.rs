use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::features::gallery::handlers::{home, serve_file, upload_image};
use crate::features::gallery::services::{GalleryService, UploadService};
use crate::shared::constants::MULTIPART_OVERHEAD;
use crate::shared::templates::TemplateEngine;

/// Shared state for the gallery routes
#[derive(Clone, FromRef)]
pub struct GalleryState {
    pub gallery: Arc<GalleryService>,
    pub uploads: Arc<UploadService>,
    pub templates: Arc<TemplateEngine>,
    /// Local directory holding uploaded images and sidecars
    pub files_root: Arc<PathBuf>,
}

/// Create routes for the gallery feature
pub fn routes(state: GalleryState, max_upload_size: usize) -> Router {
    Router::new()
        .route("/", get(home))
        .route(
            "/upload",
            post(upload_image).layer(DefaultBodyLimit::max(max_upload_size + MULTIPART_OVERHEAD)),
        )
        .route("/files/{user_id}/{filename}", get(serve_file))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::captioner::Caption;
    use crate::features::gallery::services::{INVALID_FILE_FORMAT, NO_FILE_SELECTED};
    use crate::shared::test_helpers::{FakeCaptioner, InMemoryStorage};
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;

    struct TestApp {
        server: TestServer,
        storage: Arc<InMemoryStorage>,
        captioner: Arc<FakeCaptioner>,
        dir: tempfile::TempDir,
    }

    fn test_app(storage: InMemoryStorage, captioner: FakeCaptioner) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(storage);
        let captioner = Arc::new(captioner);

        let state = GalleryState {
            gallery: Arc::new(GalleryService::new(storage.clone(), dir.path())),
            uploads: Arc::new(UploadService::new(
                storage.clone(),
                captioner.clone(),
                dir.path(),
            )),
            templates: Arc::new(TemplateEngine::embedded().unwrap()),
            files_root: Arc::new(dir.path().to_path_buf()),
        };
        let server = TestServer::new(routes(state, 1024 * 1024)).unwrap();

        TestApp {
            server,
            storage,
            captioner,
            dir,
        }
    }

    fn image_form(file_name: &str, data: &[u8]) -> MultipartForm {
        MultipartForm::new().add_part(
            "form_file",
            Part::bytes(data.to_vec())
                .file_name(file_name)
                .mime_type("application/octet-stream"),
        )
    }

    #[tokio::test]
    async fn test_home_without_images() {
        let app = test_app(InMemoryStorage::new(), FakeCaptioner::returning("T", "D"));

        let response = app.server.get("/").await;

        response.assert_status_ok();
        assert!(response.text().contains("No images yet"));
        assert!(response.text().contains(r#"name="form_file""#));
    }

    #[tokio::test]
    async fn test_upload_cat_then_view() {
        let app = test_app(
            InMemoryStorage::new(),
            FakeCaptioner::returning("Curious Cat", "A tabby looking up."),
        );

        let response = app
            .server
            .post("/upload")
            .multipart(image_form("cat.jpg", b"\xff\xd8cat"))
            .await;

        response.assert_status(StatusCode::FOUND);
        assert_eq!(response.header("location"), "/");

        let local = app.dir.path().join("default_user");
        assert_eq!(app.captioner.calls(), vec![local.join("cat.jpg")]);
        assert_eq!(
            std::fs::read_to_string(local.join("cat.txt")).unwrap(),
            "Curious Cat\nA tabby looking up."
        );
        assert_eq!(
            app.storage.keys(),
            vec!["default_user/cat.txt", "default_user/cat.jpg"]
        );

        let home = app.server.get("/").await;
        home.assert_status_ok();
        let html = home.text();
        assert!(html.contains("/files/default_user/cat.jpg"));
        assert!(html.contains("Curious Cat"));
        assert!(html.contains("A tabby looking up."));

        let file = app.server.get("/files/default_user/cat.jpg").await;
        file.assert_status_ok();
        assert_eq!(&file.as_bytes()[..], b"\xff\xd8cat");
        assert_eq!(file.header("content-type"), "image/jpeg");
    }

    #[tokio::test]
    async fn test_upload_rejects_invalid_extension() {
        let app = test_app(InMemoryStorage::new(), FakeCaptioner::returning("T", "D"));

        let response = app
            .server
            .post("/upload")
            .multipart(image_form("notes.txt", b"hello"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text(INVALID_FILE_FORMAT);
        assert!(!app.dir.path().join("default_user").exists());
        assert!(app.storage.keys().is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejects_trailing_space_after_extension() {
        let app = test_app(InMemoryStorage::new(), FakeCaptioner::returning("T", "D"));

        let response = app
            .server
            .post("/upload")
            .multipart(image_form("cat.jpg ", b"jpg"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text(INVALID_FILE_FORMAT);
        assert!(app.storage.keys().is_empty());
    }

    #[tokio::test]
    async fn test_upload_name_with_double_dot_is_served() {
        let app = test_app(InMemoryStorage::new(), FakeCaptioner::returning("T", "D"));

        app.server
            .post("/upload")
            .multipart(image_form("my..cat.jpg", b"dots"))
            .await
            .assert_status(StatusCode::FOUND);
        assert_eq!(
            app.storage.keys(),
            vec!["default_user/my..cat.txt", "default_user/my..cat.jpg"]
        );

        let file = app.server.get("/files/default_user/my..cat.jpg").await;
        file.assert_status_ok();
        assert_eq!(&file.as_bytes()[..], b"dots");
    }

    #[tokio::test]
    async fn test_upload_without_file() {
        let app = test_app(InMemoryStorage::new(), FakeCaptioner::returning("T", "D"));

        let response = app
            .server
            .post("/upload")
            .multipart(MultipartForm::new().add_text("comment", "no file here"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text(NO_FILE_SELECTED);

        let response = app
            .server
            .post("/upload")
            .multipart(image_form("", b""))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text(NO_FILE_SELECTED);

        assert!(app.captioner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upload_with_unparseable_caption_completes() {
        let app = test_app(
            InMemoryStorage::new(),
            FakeCaptioner::with_caption(Caption::Unparseable {
                reason: "not JSON".to_string(),
            }),
        );

        let response = app
            .server
            .post("/upload")
            .multipart(image_form("beach.PNG", b"png"))
            .await;
        response.assert_status(StatusCode::FOUND);

        assert_eq!(
            app.storage.keys(),
            vec!["default_user/beach.txt", "default_user/beach.PNG"]
        );

        let html = app.server.get("/").await.text();
        assert!(html.contains("Error generating title"));
        assert!(html.contains("Error generating description"));
    }

    #[tokio::test]
    async fn test_upload_captioner_failure_is_bad_gateway() {
        let app = test_app(InMemoryStorage::new(), FakeCaptioner::failing());

        let response = app
            .server
            .post("/upload")
            .multipart(image_form("cat.jpg", b"jpg"))
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        assert!(app.storage.keys().is_empty());
    }

    #[tokio::test]
    async fn test_home_fails_when_sidecar_missing() {
        let app = test_app(
            InMemoryStorage::new().with_object("default_user/orphan.jpg", b"jpg"),
            FakeCaptioner::returning("T", "D"),
        );

        let response = app.server.get("/").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_serve_missing_or_unsafe_file() {
        let app = test_app(InMemoryStorage::new(), FakeCaptioner::returning("T", "D"));
        std::fs::write(app.dir.path().join("secret.jpg"), b"secret").unwrap();

        app.server
            .get("/files/default_user/missing.jpg")
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.server
            .get("/files/..%2F/secret.jpg")
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.server
            .get("/files/default_user/..%5Csecret.jpg")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
