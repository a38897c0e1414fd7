use axum::{
    extract::{Multipart, Path, Request, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::gallery::dtos::HomePageDto;
use crate::features::gallery::services::{GalleryService, UploadService, NO_FILE_SELECTED};
use crate::shared::templates::TemplateEngine;

/// Multipart field carrying the uploaded image
pub const UPLOAD_FIELD: &str = "form_file";

const HOME_TEMPLATE: &str = "gallery/index.html";

/// Home page: every captioned image plus the upload form
pub async fn home(
    State(service): State<Arc<GalleryService>>,
    State(templates): State<Arc<TemplateEngine>>,
) -> Result<Html<String>> {
    let images = service.list_images().await?;
    let html = templates
        .render(HOME_TEMPLATE, HomePageDto::new(images))
        .map_err(|e| AppError::Template(e.to_string()))?;
    Ok(Html(html))
}

/// Accepts `form_file` from a multipart form and redirects back home
pub async fn upload_image(
    State(service): State<Arc<UploadService>>,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;
        upload = Some((file_name, data.to_vec()));
    }

    let (file_name, data) =
        upload.ok_or_else(|| AppError::BadRequest(NO_FILE_SELECTED.to_string()))?;

    service.upload(&file_name, data).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, "/")]).into_response())
}

/// Raw bytes of a locally stored upload
pub async fn serve_file(
    State(files_root): State<Arc<PathBuf>>,
    Path((user_id, file_name)): Path<(String, String)>,
    request: Request,
) -> Result<Response> {
    if !is_plain_segment(&user_id) || !is_plain_segment(&file_name) {
        return Err(AppError::NotFound(format!(
            "File {}/{} not found",
            user_id, file_name
        )));
    }

    let path = files_root.join(&user_id).join(&file_name);
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(AppError::NotFound(format!(
            "File {}/{} not found",
            user_id, file_name
        )));
    }

    let response = ServeFile::new(path)
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});
    Ok(response.into_response())
}

/// Non-empty path segment that names an entry inside its parent directory
fn is_plain_segment(segment: &str) -> bool {
    !matches!(segment, "" | "." | "..") && !segment.contains(['/', '\\'])
}
