//! Shared test fixtures: a server wired to a temp data directory and
//! unreachable external services.

use atelier_core::Config;
use axum_test::TestServer;
use tempfile::TempDir;

pub struct TestApp {
    pub server: TestServer,
    // Held so the data directory outlives the server.
    pub data_dir: TempDir,
}

pub fn test_config(data_dir: &std::path::Path) -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        // Nothing listens on port 1; engine-dependent paths fail fast.
        engine_url: "http://127.0.0.1:1".to_string(),
        runtime_url: "http://127.0.0.1:1".to_string(),
        data_dir: data_dir.to_path_buf(),
        media_base_url: "/media".to_string(),
        voice_max_file_size_bytes: 50 * 1024 * 1024,
        voice_allowed_content_types: vec![
            "audio/wav".to_string(),
            "audio/mpeg".to_string(),
            "audio/mp3".to_string(),
            "audio/ogg".to_string(),
            "audio/flac".to_string(),
        ],
        chat_default_model: "gemma".to_string(),
        chat_timeout_secs: 2,
        tts_python_path: "sh".to_string(),
        tts_script_path: "-c".to_string(),
        tts_timeout_secs: 10,
        poll_interval_ms: 0,
        max_poll_ticks: 5,
    }
}

pub async fn spawn_app() -> TestApp {
    let data_dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(data_dir.path());
    let (_state, router) = atelier_api::setup::initialize_app(config)
        .await
        .expect("initialize app");

    TestApp {
        server: TestServer::new(router).expect("test server"),
        data_dir,
    }
}
