//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only
//! what they need via Axum's `FromRef`.

use std::sync::Arc;

use atelier_core::Config;
use atelier_engine::{JobPoller, MediaProxy, OllamaClient, TtsBridge};
use atelier_store::{MediaJournal, MediaLibrary, VoiceRegistry};

// ----- Sub-state types -----

/// Local persistence: journals, the media library, and the voice registry.
#[derive(Clone)]
pub struct StoreState {
    pub image_journal: MediaJournal,
    pub video_journal: MediaJournal,
    pub library: MediaLibrary,
    pub voices: VoiceRegistry,
}

impl StoreState {
    pub fn journal_for(&self, kind: atelier_core::models::MediaKind) -> &MediaJournal {
        match kind {
            atelier_core::models::MediaKind::Image => &self.image_journal,
            atelier_core::models::MediaKind::Video => &self.video_journal,
        }
    }
}

/// External collaborators: the diffusion engine, the LLM runtime, and the
/// TTS subprocess, plus the poller that drives generation jobs.
#[derive(Clone)]
pub struct EngineState {
    pub proxy: MediaProxy,
    pub poller: JobPoller,
    pub ollama: OllamaClient,
    pub tts: TtsBridge,
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: StoreState,
    pub engine: EngineState,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for StoreState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.store.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for EngineState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.engine.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
