//! Application initialization: state wiring, routes, and the server.

pub mod routes;
pub mod server;

use std::sync::Arc;
use std::time::Duration;

use atelier_core::models::MediaKind;
use atelier_core::Config;
use atelier_engine::{ComfyClient, JobPoller, MediaProxy, OllamaClient, PollerConfig, TtsBridge};
use atelier_store::{MediaJournal, MediaLibrary, VoiceRegistry};
use axum::Router;
use tracing_subscriber::{fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::state::{AppState, EngineState, StoreState};

/// Console tracing: compact format, env-filterable.
pub fn init_tracing() {
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelier=debug,tower_http=debug".into()),
        )
        .with(console_fmt)
        .init();
}

/// Wire up stores, engine clients, the poller, and the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router), anyhow::Error> {
    tokio::fs::create_dir_all(&config.data_dir).await?;

    let comfy = ComfyClient::new(&config.engine_url);
    let library = MediaLibrary::new(&config.data_dir, &config.media_base_url);
    let proxy = MediaProxy::new(comfy, library.clone());

    let image_journal = MediaJournal::new(&config.data_dir, MediaKind::Image);
    let video_journal = MediaJournal::new(&config.data_dir, MediaKind::Video);

    let poller = JobPoller::new(
        proxy.clone(),
        image_journal.clone(),
        video_journal.clone(),
        PollerConfig {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_poll_ticks: config.max_poll_ticks,
            ..PollerConfig::default()
        },
    );

    let voices = VoiceRegistry::new(
        &config.data_dir,
        &config.media_base_url,
        config.voice_max_file_size_bytes,
        config.voice_allowed_content_types.clone(),
    );

    let state = Arc::new(AppState {
        store: StoreState {
            image_journal,
            video_journal,
            library,
            voices,
        },
        engine: EngineState {
            poller,
            proxy,
            ollama: OllamaClient::new(
                &config.runtime_url,
                Duration::from_secs(config.chat_timeout_secs),
            ),
            tts: TtsBridge::new(
                &config.tts_python_path,
                &config.tts_script_path,
                Duration::from_secs(config.tts_timeout_secs),
            ),
        },
        config: config.clone(),
    });

    let router = routes::setup_routes(&config, state.clone())?;
    Ok((state, router))
}
