//! Filesystem media listing and deletion, per kind.

use atelier_core::models::{LibraryEntry, MediaKind};
use atelier_core::AppError;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::StoreState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuery {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub clear_all: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageListResponse {
    pub success: bool,
    pub images: Vec<LibraryEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoListResponse {
    pub success: bool,
    pub videos: Vec<LibraryEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/api/images",
    tag = "media",
    responses((status = 200, description = "Images on disk", body = ImageListResponse))
)]
pub async fn list_images(State(store): State<StoreState>) -> Json<ImageListResponse> {
    Json(ImageListResponse {
        success: true,
        images: store.library.list(MediaKind::Image).await,
    })
}

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "media",
    responses((status = 200, description = "Videos on disk", body = VideoListResponse))
)]
pub async fn list_videos(State(store): State<StoreState>) -> Json<VideoListResponse> {
    Json(VideoListResponse {
        success: true,
        videos: store.library.list(MediaKind::Video).await,
    })
}

#[utoipa::path(
    delete,
    path = "/api/images",
    tag = "media",
    params(
        ("filename" = Option<String>, Query, description = "Single file to delete"),
        ("clearAll" = Option<bool>, Query, description = "Delete every image")
    ),
    responses(
        (status = 200, description = "Deleted", body = DeleteResponse),
        (status = 400, description = "Missing filename", body = ErrorResponse),
        (status = 404, description = "No such file", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(store))]
pub async fn delete_images(
    State(store): State<StoreState>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    delete_media(&store, MediaKind::Image, query).await
}

#[utoipa::path(
    delete,
    path = "/api/videos",
    tag = "media",
    params(
        ("filename" = Option<String>, Query, description = "Single file to delete"),
        ("clearAll" = Option<bool>, Query, description = "Delete every video")
    ),
    responses(
        (status = 200, description = "Deleted", body = DeleteResponse),
        (status = 400, description = "Missing filename", body = ErrorResponse),
        (status = 404, description = "No such file", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(store))]
pub async fn delete_videos(
    State(store): State<StoreState>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    delete_media(&store, MediaKind::Video, query).await
}

async fn delete_media(
    store: &StoreState,
    kind: MediaKind,
    query: DeleteQuery,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    let journal = store.journal_for(kind);

    if query.clear_all == Some(true) {
        store.library.clear(kind).await?;
        journal.replace_all(&[]).await?;
        return Ok(Json(DeleteResponse {
            success: true,
            message: format!("All {}s cleared", kind),
        }));
    }

    let Some(filename) = query.filename.filter(|f| !f.is_empty()) else {
        return Err(
            AppError::InvalidInput("Filename is required for deletion".to_string()).into(),
        );
    };

    store.library.delete(kind, &filename).await?;

    // Post-delete reconciliation: drop the matching journal record too.
    let remaining: Vec<_> = journal
        .list()
        .await
        .into_iter()
        .filter(|r| r.journal_key() != filename)
        .collect();
    journal.replace_all(&remaining).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: format!(
            "{} deleted successfully",
            match kind {
                MediaKind::Image => "Image",
                MediaKind::Video => "Video",
            }
        ),
    }))
}
