//! Media metadata journal
//!
//! One JSON file per media kind holding the most recent [`MediaRecord`]s.
//! Reads of an absent or unparseable file yield an empty list so the
//! first-run case never fails; writes replace the whole file.

use std::path::PathBuf;

use atelier_core::models::{MediaKind, MediaRecord};
use tokio::fs;

use crate::error::{StoreError, StoreResult};

/// The journal never holds more than this many records per kind.
pub const MAX_JOURNAL_RECORDS: usize = 10;

/// JSON-file-backed journal for one media kind.
#[derive(Clone)]
pub struct MediaJournal {
    kind: MediaKind,
    path: PathBuf,
}

impl MediaJournal {
    pub fn new(data_dir: impl Into<PathBuf>, kind: MediaKind) -> Self {
        let path = data_dir.into().join(kind.journal_file_name());
        Self { kind, path }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Current records, most recent first. An absent file is the first-run
    /// case and yields an empty list; a corrupt file is logged and treated
    /// the same so a bad write never wedges the journal.
    pub async fn list(&self) -> Vec<MediaRecord> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_slice::<Vec<MediaRecord>>(&data) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Journal file unreadable, treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Prepend a record and truncate to the cap.
    pub async fn append(&self, record: MediaRecord) -> StoreResult<Vec<MediaRecord>> {
        let mut records = self.list().await;
        records.truncate(MAX_JOURNAL_RECORDS - 1);
        records.insert(0, record);
        self.write(&records).await?;
        Ok(records)
    }

    /// Unconditional overwrite, used for bulk edits (clear-all,
    /// post-delete reconciliation).
    pub async fn replace_all(&self, records: &[MediaRecord]) -> StoreResult<()> {
        self.write(records).await
    }

    async fn write(&self, records: &[MediaRecord]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(records)?;
        fs::write(&self.path, data).await.map_err(|e| {
            StoreError::WriteFailed(format!(
                "Failed to write journal {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            kind = %self.kind,
            count = records.len(),
            "Journal written"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn record(name: &str) -> MediaRecord {
        MediaRecord {
            filename: name.to_string(),
            subfolder: "atelier".to_string(),
            job_id: format!("job-{}", name),
            local_path: Some(format!("/media/images/{}", name)),
            local_filename: Some(name.to_string()),
            prompt: Some("a red fox".to_string()),
            negative_prompt: None,
            input_image: None,
            is_favorite: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_list_absent_file_is_empty() {
        let dir = tempdir().unwrap();
        let journal = MediaJournal::new(dir.path(), MediaKind::Image);
        assert!(journal.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_append_prepends() {
        let dir = tempdir().unwrap();
        let journal = MediaJournal::new(dir.path(), MediaKind::Image);

        journal.append(record("a.png")).await.unwrap();
        journal.append(record("b.png")).await.unwrap();

        let records = journal.list().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].filename, "b.png");
        assert_eq!(records[1].filename, "a.png");
    }

    #[tokio::test]
    async fn test_append_never_exceeds_cap() {
        let dir = tempdir().unwrap();
        let journal = MediaJournal::new(dir.path(), MediaKind::Image);

        for i in 0..25 {
            journal.append(record(&format!("{}.png", i))).await.unwrap();
            let records = journal.list().await;
            assert!(records.len() <= MAX_JOURNAL_RECORDS);
            // Most recent insertion always first
            assert_eq!(records[0].filename, format!("{}.png", i));
        }

        let records = journal.list().await;
        assert_eq!(records.len(), MAX_JOURNAL_RECORDS);
        assert_eq!(records[0].filename, "24.png");
        assert_eq!(records[9].filename, "15.png");
    }

    #[tokio::test]
    async fn test_replace_all_overwrites() {
        let dir = tempdir().unwrap();
        let journal = MediaJournal::new(dir.path(), MediaKind::Video);

        journal.append(record("a.mp4")).await.unwrap();
        journal.replace_all(&[]).await.unwrap();
        assert!(journal.list().await.is_empty());

        journal
            .replace_all(&[record("x.mp4"), record("y.mp4")])
            .await
            .unwrap();
        let records = journal.list().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].filename, "x.mp4");
    }

    #[tokio::test]
    async fn test_corrupt_file_treated_as_empty() {
        let dir = tempdir().unwrap();
        let journal = MediaJournal::new(dir.path(), MediaKind::Image);

        tokio::fs::write(dir.path().join("image-data.json"), b"not json")
            .await
            .unwrap();
        assert!(journal.list().await.is_empty());

        // A corrupt file does not block subsequent writes
        journal.append(record("a.png")).await.unwrap();
        assert_eq!(journal.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_journals_are_per_kind() {
        let dir = tempdir().unwrap();
        let images = MediaJournal::new(dir.path(), MediaKind::Image);
        let videos = MediaJournal::new(dir.path(), MediaKind::Video);

        images.append(record("a.png")).await.unwrap();
        assert!(videos.list().await.is_empty());
    }
}
