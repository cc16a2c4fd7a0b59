//! Installed-model listing from the LLM runtime.

use std::sync::Arc;

use atelier_engine::FALLBACK_MODELS;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ModelsResponse {
    pub models: Vec<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/models",
    tag = "bridges",
    responses((status = 200, description = "Installed models, or the fallback list", body = ModelsResponse))
)]
pub async fn models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    match state.engine.ollama.list_models().await {
        Ok(models) if !models.is_empty() => Json(ModelsResponse {
            models,
            success: true,
            error: None,
        }),
        Ok(_) | Err(_) => Json(ModelsResponse {
            models: FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
            success: false,
            error: Some("Could not connect to the runtime. Using fallback model list.".to_string()),
        }),
    }
}
