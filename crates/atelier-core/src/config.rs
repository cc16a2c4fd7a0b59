//! Configuration module
//!
//! Environment-driven configuration for the server and the external
//! collaborators (diffusion engine, LLM runtime, TTS subprocess).

use std::env;
use std::path::PathBuf;

// Common constants
const SERVER_PORT: u16 = 4000;
const VOICE_MAX_FILE_SIZE_MB: usize = 50;
const CHAT_TIMEOUT_SECS: u64 = 120;
const TTS_TIMEOUT_SECS: u64 = 300;
const POLL_INTERVAL_MS: u64 = 1000;
const MAX_POLL_TICKS: u32 = 600;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Base URL of the diffusion engine (ComfyUI).
    pub engine_url: String,
    /// Base URL of the LLM runtime (Ollama).
    pub runtime_url: String,
    /// Root directory for journals, media files, and voice assets.
    pub data_dir: PathBuf,
    /// URL prefix under which the data directory is served.
    pub media_base_url: String,
    pub voice_max_file_size_bytes: usize,
    pub voice_allowed_content_types: Vec<String>,
    pub chat_default_model: String,
    pub chat_timeout_secs: u64,
    pub tts_python_path: String,
    pub tts_script_path: String,
    pub tts_timeout_secs: u64,
    /// Interval between generation-status polls.
    pub poll_interval_ms: u64,
    /// Poll ticks before a job is abandoned.
    pub max_poll_ticks: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let voice_max_file_size_mb = env::var("VOICE_MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| VOICE_MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()?;

        let voice_allowed_content_types = env::var("VOICE_ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| "audio/wav,audio/mpeg,audio/mp3,audio/ogg,audio/flac".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        Ok(Self {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()?,
            cors_origins,
            environment,
            engine_url: env::var("COMFYUI_URL")
                .unwrap_or_else(|_| "http://localhost:8188".to_string()),
            runtime_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            data_dir: env::var("DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string())
                .into(),
            media_base_url: env::var("MEDIA_BASE_URL").unwrap_or_else(|_| "/media".to_string()),
            voice_max_file_size_bytes: voice_max_file_size_mb * 1024 * 1024,
            voice_allowed_content_types,
            chat_default_model: env::var("CHAT_DEFAULT_MODEL")
                .unwrap_or_else(|_| "gemma".to_string()),
            chat_timeout_secs: env::var("CHAT_TIMEOUT_SECS")
                .unwrap_or_else(|_| CHAT_TIMEOUT_SECS.to_string())
                .parse()?,
            tts_python_path: env::var("TTS_PYTHON_PATH")
                .unwrap_or_else(|_| "python3".to_string()),
            tts_script_path: env::var("TTS_SCRIPT_PATH")
                .unwrap_or_else(|_| "tts_service.py".to_string()),
            tts_timeout_secs: env::var("TTS_TIMEOUT_SECS")
                .unwrap_or_else(|_| TTS_TIMEOUT_SECS.to_string())
                .parse()?,
            poll_interval_ms: env::var("POLL_INTERVAL_MS")
                .unwrap_or_else(|_| POLL_INTERVAL_MS.to_string())
                .parse()?,
            max_poll_ticks: env::var("MAX_POLL_TICKS")
                .unwrap_or_else(|_| MAX_POLL_TICKS.to_string())
                .parse()?,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_production() {
        let mut config = Config {
            server_port: 4000,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            engine_url: "http://localhost:8188".to_string(),
            runtime_url: "http://localhost:11434".to_string(),
            data_dir: "./data".into(),
            media_base_url: "/media".to_string(),
            voice_max_file_size_bytes: 50 * 1024 * 1024,
            voice_allowed_content_types: vec!["audio/wav".to_string()],
            chat_default_model: "gemma".to_string(),
            chat_timeout_secs: 120,
            tts_python_path: "python3".to_string(),
            tts_script_path: "tts_service.py".to_string(),
            tts_timeout_secs: 300,
            poll_interval_ms: 1000,
            max_poll_ticks: 600,
        };
        assert!(!config.is_production());

        config.environment = "Production".to_string();
        assert!(config.is_production());

        config.environment = "prod".to_string();
        assert!(config.is_production());
    }
}
