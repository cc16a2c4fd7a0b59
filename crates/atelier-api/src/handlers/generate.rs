//! Generation job submission and status.

use std::sync::Arc;

use atelier_core::models::JobState;
use atelier_core::AppError;
use atelier_engine::JobSpec;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    pub prompt: String,
    #[serde(default)]
    pub negative_prompt: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoRequest {
    pub prompt: String,
    #[serde(default)]
    pub negative_prompt: String,
    /// Engine-assigned name of the staged input image (from the inputs
    /// endpoints), round-tripped into the job graph verbatim.
    pub input_name: String,
    /// Display reference of the source image, kept on the journaled record.
    #[serde(default)]
    pub input_image: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub job_id: Uuid,
    pub prompt_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobResponse {
    pub success: bool,
    pub job: JobState,
}

#[utoipa::path(
    post,
    path = "/api/generate/image",
    tag = "generate",
    request_body = GenerateImageRequest,
    responses(
        (status = 200, description = "Job submitted", body = GenerateResponse),
        (status = 400, description = "Missing prompt", body = ErrorResponse),
        (status = 502, description = "Engine unreachable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, body))]
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateImageRequest>,
) -> Result<Json<GenerateResponse>, HttpAppError> {
    if body.prompt.trim().is_empty() {
        return Err(AppError::InvalidInput("Prompt is required".to_string()).into());
    }

    let spec = JobSpec {
        prompt: body.prompt,
        negative_prompt: body.negative_prompt,
        input_image: None,
    };
    let job = state.engine.poller.submit_image(spec).await?;

    Ok(Json(GenerateResponse {
        success: true,
        job_id: job.id,
        prompt_id: job.prompt_id,
    }))
}

#[utoipa::path(
    post,
    path = "/api/generate/video",
    tag = "generate",
    request_body = GenerateVideoRequest,
    responses(
        (status = 200, description = "Job submitted", body = GenerateResponse),
        (status = 400, description = "Missing prompt or input image", body = ErrorResponse),
        (status = 502, description = "Engine unreachable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, body))]
pub async fn generate_video(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateVideoRequest>,
) -> Result<Json<GenerateResponse>, HttpAppError> {
    if body.prompt.trim().is_empty() {
        return Err(AppError::InvalidInput("Prompt is required".to_string()).into());
    }
    if body.input_name.trim().is_empty() {
        return Err(AppError::InvalidInput("Input image is required".to_string()).into());
    }

    let spec = JobSpec {
        prompt: body.prompt,
        negative_prompt: body.negative_prompt,
        input_image: body.input_image,
    };
    let job = state
        .engine
        .poller
        .submit_video(spec, &body.input_name)
        .await?;

    Ok(Json(GenerateResponse {
        success: true,
        job_id: job.id,
        prompt_id: job.prompt_id,
    }))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    tag = "generate",
    params(("id" = Uuid, Path, description = "Job id returned at submission")),
    responses(
        (status = 200, description = "Current job state", body = JobResponse),
        (status = 404, description = "Unknown job", body = ErrorResponse)
    )
)]
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, HttpAppError> {
    let job = state
        .engine
        .poller
        .tracker()
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))?;

    Ok(Json(JobResponse { success: true, job }))
}
