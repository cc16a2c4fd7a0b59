//! Voice registry
//!
//! CRUD over TTS voice profiles with a file-coupled lifecycle: the registry
//! JSON lists the profiles, the voices directory holds the audio files.
//! Registry consistency is prioritized over storage cleanup, so a failed
//! audio-file deletion is logged rather than surfaced.

use std::path::{Path, PathBuf};

use atelier_core::models::VoiceProfile;
use serde::{Deserialize, Serialize};
use tokio::fs;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Serialize, Deserialize)]
struct RegistryFile {
    voices: Vec<VoiceProfile>,
}

/// A validated voice upload request.
#[derive(Debug)]
pub struct VoiceUpload {
    pub data: Vec<u8>,
    pub content_type: String,
    pub original_name: String,
    pub name: String,
    pub description: String,
}

#[derive(Clone)]
pub struct VoiceRegistry {
    voices_dir: PathBuf,
    json_path: PathBuf,
    base_url: String,
    max_file_size: usize,
    allowed_content_types: Vec<String>,
}

impl VoiceRegistry {
    /// # Arguments
    /// * `data_dir` - Root data directory; voices live under `voices/`
    /// * `base_url` - URL prefix the data directory is served under
    pub fn new(
        data_dir: impl Into<PathBuf>,
        base_url: &str,
        max_file_size: usize,
        allowed_content_types: Vec<String>,
    ) -> Self {
        let voices_dir = data_dir.into().join("voices");
        let json_path = voices_dir.join("voices.json");
        Self {
            voices_dir,
            json_path,
            base_url: format!("{}/voices", base_url.trim_end_matches('/')),
            max_file_size,
            allowed_content_types,
        }
    }

    /// All profiles. An absent or unreadable registry yields the built-in
    /// default so the TTS surface always has at least one voice.
    pub async fn list(&self) -> Vec<VoiceProfile> {
        match fs::read(&self.json_path).await {
            Ok(data) => match serde_json::from_slice::<RegistryFile>(&data) {
                Ok(registry) => registry.voices,
                Err(e) => {
                    tracing::warn!(
                        path = %self.json_path.display(),
                        error = %e,
                        "Voice registry unreadable, falling back to built-in default"
                    );
                    vec![VoiceProfile::built_in_default()]
                }
            },
            Err(_) => vec![VoiceProfile::built_in_default()],
        }
    }

    /// Validate and persist an uploaded voice: audio bytes first, then the
    /// updated registry. Validation failures happen before any side effect.
    pub async fn upload(&self, upload: VoiceUpload) -> StoreResult<VoiceProfile> {
        let name = upload.name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation("Voice name is required".to_string()));
        }

        if !self
            .allowed_content_types
            .iter()
            .any(|t| t == &upload.content_type)
        {
            return Err(StoreError::Validation(format!(
                "Invalid file type '{}'. Only WAV, MP3, OGG, and FLAC files are allowed",
                upload.content_type
            )));
        }

        if upload.data.len() > self.max_file_size {
            return Err(StoreError::FileTooLarge {
                size: upload.data.len(),
                max: self.max_file_size,
            });
        }

        let extension = Path::new(&upload.original_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("wav")
            .to_string();
        let id = Uuid::new_v4().to_string();
        let filename = format!("{}.{}", id, extension);

        fs::create_dir_all(&self.voices_dir).await?;
        let audio_path = self.voices_dir.join(&filename);
        fs::write(&audio_path, &upload.data).await.map_err(|e| {
            StoreError::WriteFailed(format!("Failed to write {}: {}", audio_path.display(), e))
        })?;

        let profile = VoiceProfile {
            id,
            name: name.to_string(),
            description: upload.description.trim().to_string(),
            file_path: format!("{}/{}", self.base_url, filename),
            is_default: false,
            created_at: chrono::Utc::now(),
            kind: atelier_core::models::VoiceKind::Uploaded,
        };

        let mut voices = self.list().await;
        voices.push(profile.clone());
        self.write(&voices).await?;

        tracing::info!(
            voice_id = %profile.id,
            name = %profile.name,
            size_bytes = upload.data.len(),
            "Voice uploaded"
        );

        Ok(profile)
    }

    /// Update name and/or description of a profile.
    pub async fn update(
        &self,
        id: &str,
        name: Option<String>,
        description: Option<String>,
    ) -> StoreResult<VoiceProfile> {
        let mut voices = self.list().await;
        let voice = voices
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| StoreError::NotFound("Voice not found".to_string()))?;

        if let Some(name) = name {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                voice.name = trimmed.to_string();
            }
        }
        if let Some(description) = description {
            voice.description = description.trim().to_string();
        }

        let updated = voice.clone();
        self.write(&voices).await?;
        Ok(updated)
    }

    /// Remove a profile and best-effort delete its audio file. Default
    /// profiles are protected.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut voices = self.list().await;
        let index = voices
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| StoreError::NotFound("Voice not found".to_string()))?;

        if voices[index].is_default {
            return Err(StoreError::Protected(
                "Cannot delete default voice".to_string(),
            ));
        }

        let voice = voices.remove(index);
        self.write(&voices).await?;

        if let Some(filename) = voice.file_path.rsplit('/').next() {
            let audio_path = self.voices_dir.join(filename);
            if let Err(e) = fs::remove_file(&audio_path).await {
                tracing::warn!(
                    path = %audio_path.display(),
                    error = %e,
                    "Could not delete voice file"
                );
            }
        }

        tracing::info!(voice_id = %id, "Voice deleted");
        Ok(())
    }

    /// Resolve a voice selector to a servable file path. Selectors starting
    /// with `/` are already paths; anything else is treated as a registry
    /// id.
    pub async fn resolve(&self, selector: &str) -> Option<String> {
        if selector.starts_with('/') {
            return Some(selector.to_string());
        }
        self.list()
            .await
            .into_iter()
            .find(|v| v.id == selector)
            .map(|v| v.file_path)
    }

    async fn write(&self, voices: &[VoiceProfile]) -> StoreResult<()> {
        fs::create_dir_all(&self.voices_dir).await?;
        let registry = RegistryFile {
            voices: voices.to_vec(),
        };
        let data = serde_json::to_vec_pretty(&registry)?;
        fs::write(&self.json_path, data).await.map_err(|e| {
            StoreError::WriteFailed(format!(
                "Failed to write voice registry {}: {}",
                self.json_path.display(),
                e
            ))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn registry(dir: &Path) -> VoiceRegistry {
        VoiceRegistry::new(
            dir,
            "/media",
            50 * 1024 * 1024,
            vec![
                "audio/wav".to_string(),
                "audio/mpeg".to_string(),
                "audio/mp3".to_string(),
                "audio/ogg".to_string(),
                "audio/flac".to_string(),
            ],
        )
    }

    fn upload(name: &str, content_type: &str) -> VoiceUpload {
        VoiceUpload {
            data: b"RIFF....WAVE".to_vec(),
            content_type: content_type.to_string(),
            original_name: "sample.wav".to_string(),
            name: name.to_string(),
            description: "a test voice".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_seeds_built_in_default() {
        let dir = tempdir().unwrap();
        let registry = registry(dir.path());

        let voices = registry.list().await;
        assert_eq!(voices.len(), 1);
        assert!(voices[0].is_default);
        assert_eq!(voices[0].id, atelier_core::models::DEFAULT_VOICE_ID);
    }

    #[tokio::test]
    async fn test_upload_writes_audio_and_registry() {
        let dir = tempdir().unwrap();
        let registry = registry(dir.path());

        let voice = registry.upload(upload("My Voice", "audio/wav")).await.unwrap();
        assert_eq!(voice.name, "My Voice");
        assert!(!voice.is_default);
        assert!(voice.file_path.starts_with("/media/voices/"));

        let voices = registry.list().await;
        assert_eq!(voices.len(), 2);

        // Audio bytes landed on disk under the registry id
        let filename = voice.file_path.rsplit('/').next().unwrap();
        let on_disk = dir.path().join("voices").join(filename);
        assert!(on_disk.exists());
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_content_type() {
        let dir = tempdir().unwrap();
        let registry = registry(dir.path());

        let result = registry.upload(upload("My Voice", "video/mp4")).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));

        // No file was written
        assert!(!dir.path().join("voices").exists());
    }

    #[tokio::test]
    async fn test_upload_rejects_oversize() {
        let dir = tempdir().unwrap();
        let registry = VoiceRegistry::new(dir.path(), "/media", 4, vec!["audio/wav".to_string()]);

        let result = registry.upload(upload("My Voice", "audio/wav")).await;
        assert!(matches!(result, Err(StoreError::FileTooLarge { .. })));
        assert!(!dir.path().join("voices").exists());
    }

    #[tokio::test]
    async fn test_upload_requires_name() {
        let dir = tempdir().unwrap();
        let registry = registry(dir.path());

        let result = registry.upload(upload("   ", "audio/wav")).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_voice() {
        let dir = tempdir().unwrap();
        let registry = registry(dir.path());

        let voice = registry.upload(upload("Old Name", "audio/wav")).await.unwrap();
        let updated = registry
            .update(&voice.id, Some("  New Name  ".to_string()), Some(String::new()))
            .await
            .unwrap();
        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.description, "");

        let result = registry.update("nope", Some("x".to_string()), None).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_default_is_protected() {
        let dir = tempdir().unwrap();
        let registry = registry(dir.path());

        let result = registry.delete(atelier_core::models::DEFAULT_VOICE_ID).await;
        assert!(matches!(result, Err(StoreError::Protected(_))));

        // Registry unchanged
        let voices = registry.list().await;
        assert_eq!(voices.len(), 1);
        assert!(voices[0].is_default);
    }

    #[tokio::test]
    async fn test_delete_removes_entry_and_file() {
        let dir = tempdir().unwrap();
        let registry = registry(dir.path());

        let voice = registry.upload(upload("Temp", "audio/ogg")).await.unwrap();
        let filename = voice.file_path.rsplit('/').next().unwrap().to_string();

        registry.delete(&voice.id).await.unwrap();
        let voices = registry.list().await;
        assert!(voices.iter().all(|v| v.id != voice.id));
        assert!(!dir.path().join("voices").join(filename).exists());
    }

    #[tokio::test]
    async fn test_resolve_path_and_id() {
        let dir = tempdir().unwrap();
        let registry = registry(dir.path());

        // Literal paths pass through untouched
        assert_eq!(
            registry.resolve("/custom/voice.wav").await.as_deref(),
            Some("/custom/voice.wav")
        );

        let voice = registry.upload(upload("Resolved", "audio/flac")).await.unwrap();
        assert_eq!(
            registry.resolve(&voice.id).await.as_deref(),
            Some(voice.file_path.as_str())
        );

        assert!(registry.resolve("unknown-id").await.is_none());
    }
}
