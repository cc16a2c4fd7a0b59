//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use atelier_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atelier API",
        version = "0.1.0",
        description = "Local AI media studio: drive a diffusion engine, an LLM runtime, and a TTS script through one HTTP surface. Generation jobs are submitted, polled, and materialized into a locally served media library with a journaled, unified gallery."
    ),
    paths(
        // Generation
        handlers::generate::generate_image,
        handlers::generate::generate_video,
        handlers::generate::get_job,
        // Engine passthrough
        handlers::engine_proxy::engine_history,
        handlers::engine_proxy::engine_download,
        handlers::engine_proxy::upload_input,
        handlers::engine_proxy::copy_input_from_gallery,
        // Media files
        handlers::media::list_images,
        handlers::media::list_videos,
        handlers::media::delete_images,
        handlers::media::delete_videos,
        // Journals
        handlers::media_data::get_image_data,
        handlers::media_data::append_image_data,
        handlers::media_data::replace_image_data,
        handlers::media_data::get_video_data,
        handlers::media_data::append_video_data,
        handlers::media_data::replace_video_data,
        // Gallery
        handlers::gallery::gallery,
        // Voices
        handlers::voices::list_voices,
        handlers::voices::upload_voice,
        handlers::voices::update_voice,
        handlers::voices::delete_voice,
        // Bridges
        handlers::chat::chat,
        handlers::models::models,
        handlers::tts::tts,
    ),
    components(schemas(
        error::ErrorResponse,
        models::MediaKind,
        models::MediaRecord,
        models::UnifiedMediaItem,
        models::LibraryEntry,
        models::GallerySort,
        models::VoiceProfile,
        models::VoiceKind,
        models::JobPhase,
        models::JobState,
        handlers::generate::GenerateImageRequest,
        handlers::generate::GenerateVideoRequest,
        handlers::generate::GenerateResponse,
        handlers::generate::JobResponse,
        handlers::engine_proxy::HistoryResponse,
        handlers::engine_proxy::DownloadRequest,
        handlers::engine_proxy::DownloadResponse,
        handlers::engine_proxy::CopyInputRequest,
        handlers::engine_proxy::UploadInputResponse,
        handlers::media::ImageListResponse,
        handlers::media::VideoListResponse,
        handlers::media::DeleteResponse,
        handlers::media_data::ImageDataResponse,
        handlers::media_data::VideoDataResponse,
        handlers::gallery::GalleryResponse,
        handlers::voices::VoiceListResponse,
        handlers::voices::VoiceResponse,
        handlers::voices::UpdateVoiceRequest,
        handlers::voices::DeleteVoiceResponse,
        handlers::chat::ChatRequest,
        handlers::chat::ChatResponse,
        handlers::models::ModelsResponse,
        handlers::tts::TtsRequest,
        handlers::tts::TtsResponse,
    ))
)]
pub struct ApiDoc;
