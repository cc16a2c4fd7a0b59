//! TTS bridge: resolve the voice selector and run the synthesis subprocess.

use std::sync::Arc;

use atelier_core::AppError;
use atelier_engine::TtsAudio;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TtsRequest {
    pub text: String,
    /// Registry id or a literal `/`-prefixed path.
    #[serde(default)]
    pub voice: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TtsResponse {
    /// Base64-encoded audio payload.
    pub audio: String,
    pub sample_rate: u32,
    pub format: String,
}

impl From<TtsAudio> for TtsResponse {
    fn from(audio: TtsAudio) -> Self {
        Self {
            audio: audio.audio,
            sample_rate: audio.sample_rate,
            format: audio.format,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/tts",
    tag = "bridges",
    request_body = TtsRequest,
    responses(
        (status = 200, description = "Synthesized audio (base64)", body = TtsResponse),
        (status = 400, description = "Missing text", body = ErrorResponse),
        (status = 502, description = "Synthesis failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, body), fields(voice = ?body.voice))]
pub async fn tts(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TtsRequest>,
) -> Result<Json<TtsResponse>, HttpAppError> {
    if body.text.trim().is_empty() {
        return Err(AppError::InvalidInput("Text is required".to_string()).into());
    }

    // Selectors may be a registry id or already a path; an unknown id is
    // passed through untouched and left to the script to reject.
    let voice_path = match &body.voice {
        None => None,
        Some(selector) => Some(
            state
                .store
                .voices
                .resolve(selector)
                .await
                .unwrap_or_else(|| selector.clone()),
        ),
    };

    let audio = state
        .engine
        .tts
        .synthesize(&body.text, voice_path.as_deref())
        .await?;

    Ok(Json(audio.into()))
}
