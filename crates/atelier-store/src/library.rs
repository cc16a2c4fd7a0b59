//! Media library
//!
//! The on-disk tree of downloaded media files, one subdirectory per kind
//! under the data root. Files are the ground truth for what exists; the
//! journal carries provenance. Stored names embed a millisecond timestamp
//! so repeated downloads of the same engine output never collide.

use std::path::PathBuf;

use atelier_core::models::{LibraryEntry, MediaKind};
use chrono::Utc;
use tokio::fs;

use crate::error::{StoreError, StoreResult};

/// A media file persisted to the library.
#[derive(Debug, Clone)]
pub struct StoredMedia {
    /// URL under the served media root.
    pub local_path: String,
    /// Name on disk.
    pub filename: String,
}

#[derive(Clone)]
pub struct MediaLibrary {
    data_dir: PathBuf,
    base_url: String,
}

impl MediaLibrary {
    /// # Arguments
    /// * `data_dir` - Root directory for media storage
    /// * `base_url` - URL prefix the directory is served under (e.g. "/media")
    pub fn new(data_dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            base_url: base_url.into(),
        }
    }

    fn kind_dir(&self, kind: MediaKind) -> PathBuf {
        self.data_dir.join(kind.library_dir())
    }

    /// Validate a filename and resolve it inside the kind's directory.
    /// Rejects names that could escape the library tree.
    fn safe_path(&self, kind: MediaKind, filename: &str) -> StoreResult<PathBuf> {
        if filename.is_empty()
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
        {
            return Err(StoreError::InvalidName(filename.to_string()));
        }
        Ok(self.kind_dir(kind).join(filename))
    }

    /// Public URL for a stored file.
    pub fn url_for(&self, kind: MediaKind, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            kind.library_dir(),
            filename
        )
    }

    /// Files physically present for the kind, filtered to its extensions.
    /// An absent directory is the first-run case and yields an empty list.
    pub async fn list(&self, kind: MediaKind) -> Vec<LibraryEntry> {
        let dir = self.kind_dir(kind);
        let mut read_dir = match fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(_) => return Vec::new(),
        };

        let mut entries = Vec::new();
        while let Ok(Some(entry)) = read_dir.next_entry().await {
            let name = entry.file_name().to_string_lossy().to_string();
            if kind.matches_filename(&name) {
                entries.push(LibraryEntry {
                    url: self.url_for(kind, &name),
                    filename: name,
                });
            }
        }
        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        entries
    }

    /// Persist downloaded bytes under a timestamped local name
    /// (`generated_<epoch_millis>_<original>`).
    pub async fn save(
        &self,
        kind: MediaKind,
        original_name: &str,
        data: &[u8],
    ) -> StoreResult<StoredMedia> {
        // Keep only the final path component of the engine-reported name.
        let base = original_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(original_name);
        let filename = format!("generated_{}_{}", Utc::now().timestamp_millis(), base);
        let path = self.safe_path(kind, &filename)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&path, data).await.map_err(|e| {
            StoreError::WriteFailed(format!("Failed to write {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            kind = %kind,
            size_bytes = data.len(),
            "Media file saved"
        );

        Ok(StoredMedia {
            local_path: self.url_for(kind, &filename),
            filename,
        })
    }

    /// Read a stored file back (used when re-staging a gallery image as a
    /// generation input).
    pub async fn read(&self, kind: MediaKind, filename: &str) -> StoreResult<Vec<u8>> {
        let path = self.safe_path(kind, filename)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StoreError::NotFound(filename.to_string()));
        }
        Ok(fs::read(&path).await?)
    }

    pub async fn delete(&self, kind: MediaKind, filename: &str) -> StoreResult<()> {
        let path = self.safe_path(kind, filename)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StoreError::NotFound(filename.to_string()));
        }
        fs::remove_file(&path).await?;
        tracing::info!(path = %path.display(), kind = %kind, "Media file deleted");
        Ok(())
    }

    /// Delete every file for the kind. An absent directory counts as
    /// already clear.
    pub async fn clear(&self, kind: MediaKind) -> StoreResult<usize> {
        let dir = self.kind_dir(kind);
        let mut read_dir = match fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(_) => return Ok(0),
        };

        let mut removed = 0;
        while let Ok(Some(entry)) = read_dir.next_entry().await {
            if fs::remove_file(entry.path()).await.is_ok() {
                removed += 1;
            }
        }

        tracing::info!(kind = %kind, removed, "Media library cleared");
        Ok(removed)
    }
}
