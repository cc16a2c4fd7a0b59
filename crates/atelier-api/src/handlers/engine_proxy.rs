//! Engine passthrough operations: raw status, manual download, and input
//! staging.

use std::sync::Arc;

use atelier_core::models::MediaKind;
use atelier_core::AppError;
use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub success: bool,
    /// `pending`, `success`, or `error`.
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DownloadRequest {
    pub filename: String,
    #[serde(default)]
    pub subfolder: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub success: bool,
    pub local_path: String,
    pub filename: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CopyInputRequest {
    pub filename: String,
    #[serde(default)]
    pub subfolder: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadInputResponse {
    pub success: bool,
    pub uploaded_filename: String,
}

#[utoipa::path(
    get,
    path = "/api/engine/history/{prompt_id}",
    tag = "engine",
    params(("prompt_id" = String, Path, description = "Engine job id")),
    responses(
        (status = 200, description = "Job status", body = HistoryResponse),
        (status = 502, description = "Engine unreachable", body = ErrorResponse)
    )
)]
pub async fn engine_history(
    State(state): State<Arc<AppState>>,
    Path(prompt_id): Path<String>,
) -> Result<Json<HistoryResponse>, HttpAppError> {
    let entry = state.engine.proxy.comfy().history(&prompt_id).await?;

    let status = match entry {
        None => "pending".to_string(),
        Some(entry) => match entry.job_status() {
            atelier_engine::EngineJobStatus::Pending => "pending".to_string(),
            atelier_engine::EngineJobStatus::Success => "success".to_string(),
            atelier_engine::EngineJobStatus::Error => "error".to_string(),
        },
    };

    Ok(Json(HistoryResponse {
        success: true,
        status,
    }))
}

#[utoipa::path(
    post,
    path = "/api/engine/download",
    tag = "engine",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "File stored locally", body = DownloadResponse),
        (status = 404, description = "Output not available on the engine", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn engine_download(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DownloadRequest>,
) -> Result<Json<DownloadResponse>, HttpAppError> {
    if body.filename.is_empty() {
        return Err(AppError::InvalidInput("Filename is required".to_string()).into());
    }

    let stored = state
        .engine
        .proxy
        .fetch_and_store(&body.filename, &body.subfolder, body.kind)
        .await?;

    Ok(Json(DownloadResponse {
        success: true,
        local_path: stored.local_path,
        filename: stored.filename,
    }))
}

#[utoipa::path(
    post,
    path = "/api/inputs",
    tag = "engine",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Input staged on the engine", body = UploadInputResponse),
        (status = 400, description = "No image provided", body = ErrorResponse),
        (status = 502, description = "Engine unreachable", body = ErrorResponse)
    )
)]
pub async fn upload_input(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadInputResponse>, HttpAppError> {
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("image") {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read image: {}", e)))?;
            image = Some(data.to_vec());
        }
    }

    let Some(image) = image else {
        return Err(AppError::InvalidInput("No image file provided".to_string()).into());
    };

    let uploaded_filename = state
        .engine
        .proxy
        .comfy()
        .upload_input(image, "input_image.jpg")
        .await?;

    Ok(Json(UploadInputResponse {
        success: true,
        uploaded_filename,
    }))
}

#[utoipa::path(
    post,
    path = "/api/inputs/from-gallery",
    tag = "engine",
    request_body = CopyInputRequest,
    responses(
        (status = 200, description = "Gallery image re-staged as input", body = UploadInputResponse),
        (status = 400, description = "Missing filename", body = ErrorResponse),
        (status = 404, description = "Image not found locally or on the engine", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn copy_input_from_gallery(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CopyInputRequest>,
) -> Result<Json<UploadInputResponse>, HttpAppError> {
    if body.filename.is_empty() {
        return Err(AppError::InvalidInput("Filename is required".to_string()).into());
    }

    let subfolder = body
        .subfolder
        .unwrap_or_else(|| MediaKind::Image.default_subfolder().to_string());

    let uploaded_filename = state
        .engine
        .proxy
        .copy_from_gallery_to_input(&body.filename, &subfolder)
        .await?;

    Ok(Json(UploadInputResponse {
        success: true,
        uploaded_filename,
    }))
}
