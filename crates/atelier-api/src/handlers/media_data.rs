//! Journal CRUD: list, append, and replace-all per media kind.
//!
//! There is deliberately no partial-update endpoint; bulk edits go through
//! replace-all, mirroring the journal's whole-file write semantics.

use atelier_core::models::MediaRecord;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::HttpAppError;
use crate::state::StoreState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageDataResponse {
    pub success: bool,
    pub images: Vec<MediaRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoDataResponse {
    pub success: bool,
    pub videos: Vec<MediaRecord>,
}

#[utoipa::path(
    get,
    path = "/api/image-data",
    tag = "media-data",
    responses((status = 200, description = "Journaled image records", body = ImageDataResponse))
)]
pub async fn get_image_data(State(store): State<StoreState>) -> Json<ImageDataResponse> {
    Json(ImageDataResponse {
        success: true,
        images: store.image_journal.list().await,
    })
}

#[utoipa::path(
    post,
    path = "/api/image-data",
    tag = "media-data",
    request_body = MediaRecord,
    responses((status = 200, description = "Record prepended", body = ImageDataResponse))
)]
pub async fn append_image_data(
    State(store): State<StoreState>,
    Json(record): Json<MediaRecord>,
) -> Result<Json<ImageDataResponse>, HttpAppError> {
    let images = store.image_journal.append(record).await?;
    Ok(Json(ImageDataResponse {
        success: true,
        images,
    }))
}

#[utoipa::path(
    put,
    path = "/api/image-data",
    tag = "media-data",
    request_body = Vec<MediaRecord>,
    responses((status = 200, description = "Journal replaced", body = ImageDataResponse))
)]
pub async fn replace_image_data(
    State(store): State<StoreState>,
    Json(records): Json<Vec<MediaRecord>>,
) -> Result<Json<ImageDataResponse>, HttpAppError> {
    store.image_journal.replace_all(&records).await?;
    Ok(Json(ImageDataResponse {
        success: true,
        images: records,
    }))
}

#[utoipa::path(
    get,
    path = "/api/video-data",
    tag = "media-data",
    responses((status = 200, description = "Journaled video records", body = VideoDataResponse))
)]
pub async fn get_video_data(State(store): State<StoreState>) -> Json<VideoDataResponse> {
    Json(VideoDataResponse {
        success: true,
        videos: store.video_journal.list().await,
    })
}

#[utoipa::path(
    post,
    path = "/api/video-data",
    tag = "media-data",
    request_body = MediaRecord,
    responses((status = 200, description = "Record prepended", body = VideoDataResponse))
)]
pub async fn append_video_data(
    State(store): State<StoreState>,
    Json(record): Json<MediaRecord>,
) -> Result<Json<VideoDataResponse>, HttpAppError> {
    let videos = store.video_journal.append(record).await?;
    Ok(Json(VideoDataResponse {
        success: true,
        videos,
    }))
}

#[utoipa::path(
    put,
    path = "/api/video-data",
    tag = "media-data",
    request_body = Vec<MediaRecord>,
    responses((status = 200, description = "Journal replaced", body = VideoDataResponse))
)]
pub async fn replace_video_data(
    State(store): State<StoreState>,
    Json(records): Json<Vec<MediaRecord>>,
) -> Result<Json<VideoDataResponse>, HttpAppError> {
    store.video_journal.replace_all(&records).await?;
    Ok(Json(VideoDataResponse {
        success: true,
        videos: records,
    }))
}
