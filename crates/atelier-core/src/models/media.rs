use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Media kind enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Journal file name under the data root.
    pub fn journal_file_name(self) -> &'static str {
        match self {
            MediaKind::Image => "image-data.json",
            MediaKind::Video => "video-data.json",
        }
    }

    /// Library subdirectory under the data root.
    pub fn library_dir(self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
        }
    }

    /// Extensions listed for this kind when scanning the library.
    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => &["png", "jpg", "jpeg"],
            MediaKind::Video => &["mp4", "gif"],
        }
    }

    /// Subfolder assumed for records with no journal entry.
    /// Image generation writes under a fixed engine subfolder; videos land
    /// directly in the engine output root.
    pub fn default_subfolder(self) -> &'static str {
        match self {
            MediaKind::Image => "atelier",
            MediaKind::Video => "",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    /// True when `filename` carries one of this kind's extensions.
    pub fn matches_filename(self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.allowed_extensions()
            .iter()
            .any(|ext| lower.ends_with(&format!(".{}", ext)))
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A journaled media record: provenance metadata for one generated file.
///
/// `filename` is the name on local disk; `local_filename` is kept as a
/// separate field for legacy journal entries where the engine-side name and
/// the stored name diverge (fallback records keep only the engine name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub filename: String,
    #[serde(default)]
    pub subfolder: String,
    /// Correlates the record to the generation job; empty for legacy records.
    #[serde(default)]
    pub job_id: String,
    /// URL under the served media root; `None` means rely on the remote
    /// engine URL fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    /// Source image reference; present only for video records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_image: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

impl MediaRecord {
    /// Key used to join a record against a filesystem listing: the stored
    /// name when known, otherwise the engine-side name.
    pub fn journal_key(&self) -> &str {
        self.local_filename.as_deref().unwrap_or(&self.filename)
    }
}

/// One file physically present in the media library.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LibraryEntry {
    pub filename: String,
    pub url: String,
}

/// Derived, read-only projection of a [`MediaRecord`] for the unified
/// gallery. Regenerated on every change; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedMediaItem {
    /// Synthetic id: `{kind}-{filename}-{job_id}`.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub filename: String,
    pub subfolder: String,
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_image: Option<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

impl UnifiedMediaItem {
    pub fn from_record(kind: MediaKind, record: MediaRecord) -> Self {
        let id = format!("{}-{}-{}", kind.as_str(), record.filename, record.job_id);
        Self {
            id,
            kind,
            filename: record.filename,
            subfolder: record.subfolder,
            job_id: record.job_id,
            local_path: record.local_path,
            prompt: record.prompt,
            negative_prompt: record.negative_prompt,
            input_image: record.input_image,
            is_favorite: record.is_favorite,
            created_at: record.created_at,
        }
    }
}

/// Gallery sort modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GallerySort {
    #[default]
    Newest,
    Oldest,
    Favorites,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_matches_filename() {
        assert!(MediaKind::Image.matches_filename("generated_1_fox.PNG"));
        assert!(MediaKind::Image.matches_filename("a.jpeg"));
        assert!(!MediaKind::Image.matches_filename("clip.mp4"));
        assert!(MediaKind::Video.matches_filename("clip.mp4"));
        assert!(MediaKind::Video.matches_filename("loop.gif"));
        assert!(!MediaKind::Video.matches_filename("a.png"));
    }

    #[test]
    fn test_journal_key_prefers_local_filename() {
        let record = MediaRecord {
            filename: "fox.png".to_string(),
            subfolder: "atelier".to_string(),
            job_id: "abc".to_string(),
            local_path: Some("/media/images/generated_1_fox.png".to_string()),
            local_filename: Some("generated_1_fox.png".to_string()),
            prompt: None,
            negative_prompt: None,
            input_image: None,
            is_favorite: false,
            created_at: Utc::now(),
        };
        assert_eq!(record.journal_key(), "generated_1_fox.png");
    }

    #[test]
    fn test_unified_item_id_shape() {
        let record = MediaRecord {
            filename: "clip.mp4".to_string(),
            subfolder: String::new(),
            job_id: "j1".to_string(),
            local_path: None,
            local_filename: None,
            prompt: None,
            negative_prompt: None,
            input_image: None,
            is_favorite: false,
            created_at: Utc::now(),
        };
        let item = UnifiedMediaItem::from_record(MediaKind::Video, record);
        assert_eq!(item.id, "video-clip.mp4-j1");
    }

    #[test]
    fn test_record_json_field_names() {
        let record = MediaRecord {
            filename: "fox.png".to_string(),
            subfolder: "atelier".to_string(),
            job_id: "abc".to_string(),
            local_path: Some("/media/images/fox.png".to_string()),
            local_filename: None,
            prompt: Some("a red fox".to_string()),
            negative_prompt: None,
            input_image: None,
            is_favorite: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).expect("serialize");
        assert!(json.get("jobId").is_some());
        assert!(json.get("localPath").is_some());
        assert!(json.get("isFavorite").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("local_path").is_none());
    }
}
