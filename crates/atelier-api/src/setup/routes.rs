//! Route configuration and setup.

use std::sync::Arc;
use std::time::Duration;

use atelier_core::Config;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Uploads (voice audio up to 50 MB) need more than axum's default body cap.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let api = Router::new()
        .route("/api/generate/image", post(handlers::generate::generate_image))
        .route("/api/generate/video", post(handlers::generate::generate_video))
        .route("/api/jobs/{id}", get(handlers::generate::get_job))
        .route(
            "/api/engine/history/{prompt_id}",
            get(handlers::engine_proxy::engine_history),
        )
        .route("/api/engine/download", post(handlers::engine_proxy::engine_download))
        .route("/api/inputs", post(handlers::engine_proxy::upload_input))
        .route(
            "/api/inputs/from-gallery",
            post(handlers::engine_proxy::copy_input_from_gallery),
        )
        .route(
            "/api/images",
            get(handlers::media::list_images).delete(handlers::media::delete_images),
        )
        .route(
            "/api/videos",
            get(handlers::media::list_videos).delete(handlers::media::delete_videos),
        )
        .route(
            "/api/image-data",
            get(handlers::media_data::get_image_data)
                .post(handlers::media_data::append_image_data)
                .put(handlers::media_data::replace_image_data),
        )
        .route(
            "/api/video-data",
            get(handlers::media_data::get_video_data)
                .post(handlers::media_data::append_video_data)
                .put(handlers::media_data::replace_video_data),
        )
        .route("/api/gallery", get(handlers::gallery::gallery))
        .route(
            "/api/voices",
            get(handlers::voices::list_voices)
                .post(handlers::voices::upload_voice)
                .put(handlers::voices::update_voice)
                .delete(handlers::voices::delete_voice),
        )
        .route("/api/chat", post(handlers::chat::chat))
        .route("/api/models", get(handlers::models::models))
        .route("/api/tts", post(handlers::tts::tts))
        .route("/health", get(health_check))
        .route("/api-doc/openapi.json", get(openapi_spec))
        .with_state(state);

    let router = api
        .nest_service(
            config.media_base_url.as_str(),
            ServeDir::new(&config.data_dir),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    Ok(router)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    if config.cors_origins.iter().any(|o| o == "*") {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}

#[derive(serde::Serialize)]
struct HealthCheckResponse {
    status: String,
    engine: String,
    runtime: String,
}

/// Liveness plus best-effort reachability of the external collaborators.
/// Both services being offline is a degraded-but-running state, not a
/// failure: the process itself is healthy.
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthCheckResponse> {
    const TIMEOUT: Duration = Duration::from_secs(5);

    let engine = match tokio::time::timeout(TIMEOUT, state.engine.proxy.comfy().is_available()).await
    {
        Ok(true) => "reachable".to_string(),
        Ok(false) => "unreachable".to_string(),
        Err(_) => "timeout".to_string(),
    };

    let runtime = match tokio::time::timeout(TIMEOUT, state.engine.ollama.is_available()).await {
        Ok(true) => "reachable".to_string(),
        Ok(false) => "unreachable".to_string(),
        Err(_) => "timeout".to_string(),
    };

    Json(HealthCheckResponse {
        status: "ok".to_string(),
        engine,
        runtime,
    })
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    Json(crate::api_doc::ApiDoc::openapi())
}
