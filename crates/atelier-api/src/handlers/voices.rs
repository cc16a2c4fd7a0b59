//! Voice profile CRUD.

use atelier_core::models::VoiceProfile;
use atelier_core::AppError;
use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::StoreState;

#[derive(Debug, Serialize, ToSchema)]
pub struct VoiceListResponse {
    pub success: bool,
    pub voices: Vec<VoiceProfile>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VoiceResponse {
    pub success: bool,
    pub voice: VoiceProfile,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVoiceRequest {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteVoiceQuery {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteVoiceResponse {
    pub success: bool,
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/api/voices",
    tag = "voices",
    responses((status = 200, description = "All voice profiles", body = VoiceListResponse))
)]
pub async fn list_voices(State(store): State<StoreState>) -> Json<VoiceListResponse> {
    Json(VoiceListResponse {
        success: true,
        voices: store.voices.list().await,
    })
}

#[utoipa::path(
    post,
    path = "/api/voices",
    tag = "voices",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Voice uploaded", body = VoiceResponse),
        (status = 400, description = "Missing audio, bad type, or blank name", body = ErrorResponse),
        (status = 413, description = "File exceeds size ceiling", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(store, multipart))]
pub async fn upload_voice(
    State(store): State<StoreState>,
    mut multipart: Multipart,
) -> Result<Json<VoiceResponse>, HttpAppError> {
    let mut audio: Option<(Vec<u8>, String, String)> = None;
    let mut name = String::new();
    let mut description = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("audio") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let original_name = field.file_name().unwrap_or("voice.wav").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read audio: {}", e)))?;
                audio = Some((data.to_vec(), content_type, original_name));
            }
            Some("name") => {
                name = field.text().await.unwrap_or_default();
            }
            Some("description") => {
                description = field.text().await.unwrap_or_default();
            }
            _ => {}
        }
    }

    let Some((data, content_type, original_name)) = audio else {
        return Err(AppError::InvalidInput("Audio file is required".to_string()).into());
    };

    let voice = store
        .voices
        .upload(atelier_store::VoiceUpload {
            data,
            content_type,
            original_name,
            name,
            description,
        })
        .await?;

    Ok(Json(VoiceResponse {
        success: true,
        voice,
    }))
}

#[utoipa::path(
    put,
    path = "/api/voices",
    tag = "voices",
    request_body = UpdateVoiceRequest,
    responses(
        (status = 200, description = "Voice updated", body = VoiceResponse),
        (status = 400, description = "Missing id", body = ErrorResponse),
        (status = 404, description = "Unknown voice", body = ErrorResponse)
    )
)]
pub async fn update_voice(
    State(store): State<StoreState>,
    Json(body): Json<UpdateVoiceRequest>,
) -> Result<Json<VoiceResponse>, HttpAppError> {
    if body.id.is_empty() {
        return Err(AppError::InvalidInput("Voice ID is required".to_string()).into());
    }

    let voice = store
        .voices
        .update(&body.id, body.name, body.description)
        .await?;

    Ok(Json(VoiceResponse {
        success: true,
        voice,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/voices",
    tag = "voices",
    params(("id" = String, Query, description = "Voice id to delete")),
    responses(
        (status = 200, description = "Voice deleted", body = DeleteVoiceResponse),
        (status = 400, description = "Missing id or protected default", body = ErrorResponse),
        (status = 404, description = "Unknown voice", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(store))]
pub async fn delete_voice(
    State(store): State<StoreState>,
    Query(query): Query<DeleteVoiceQuery>,
) -> Result<Json<DeleteVoiceResponse>, HttpAppError> {
    let Some(id) = query.id.filter(|id| !id.is_empty()) else {
        return Err(AppError::InvalidInput("Voice ID is required".to_string()).into());
    };

    store.voices.delete(&id).await?;

    Ok(Json(DeleteVoiceResponse {
        success: true,
        message: "Voice deleted successfully".to_string(),
    }))
}
