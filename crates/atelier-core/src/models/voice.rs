use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sentinel id of the built-in voice profile.
pub const DEFAULT_VOICE_ID: &str = "default_female";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum VoiceKind {
    Uploaded,
    BuiltIn,
}

/// A TTS voice profile with a file-coupled lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoiceProfile {
    /// Opaque id: UUID for uploaded voices, a fixed sentinel for built-ins.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Path under the served voice-assets root.
    pub file_path: String,
    /// Default profiles cannot be deleted.
    #[serde(default)]
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: VoiceKind,
}

impl VoiceProfile {
    /// The built-in profile seeded when no registry file exists yet.
    pub fn built_in_default() -> Self {
        Self {
            id: DEFAULT_VOICE_ID.to_string(),
            name: "Default Female".to_string(),
            description: "Built-in female voice".to_string(),
            file_path: "/female_voice.wav".to_string(),
            is_default: true,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            kind: VoiceKind::BuiltIn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_default_shape() {
        let voice = VoiceProfile::built_in_default();
        assert_eq!(voice.id, DEFAULT_VOICE_ID);
        assert!(voice.is_default);
        assert_eq!(voice.kind, VoiceKind::BuiltIn);
        assert_eq!(voice.file_path, "/female_voice.wav");
    }

    #[test]
    fn test_voice_kind_json_tags() {
        let voice = VoiceProfile::built_in_default();
        let json = serde_json::to_value(&voice).expect("serialize");
        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("built-in"));
        assert!(json.get("filePath").is_some());
        assert!(json.get("isDefault").is_some());
    }
}
