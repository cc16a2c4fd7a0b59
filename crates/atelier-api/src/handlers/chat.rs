//! Chat bridge to the LLM runtime.
//!
//! An offline runtime never fails the request: the handler answers with a
//! canned reply so the conversation surface stays usable.

use std::sync::Arc;

use atelier_core::AppError;
use atelier_engine::fallback_reply;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
}

#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "bridges",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Completion or canned fallback", body = ChatResponse),
        (status = 400, description = "Missing message", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, body), fields(model = ?body.model))]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, HttpAppError> {
    if body.message.trim().is_empty() {
        return Err(AppError::InvalidInput("Message is required".to_string()).into());
    }

    let model = body
        .model
        .unwrap_or_else(|| state.config.chat_default_model.clone());

    let response = match state.engine.ollama.generate(&model, &body.message).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Runtime unreachable, using canned reply");
            fallback_reply(&body.message)
        }
    };

    Ok(Json(ChatResponse { response }))
}
