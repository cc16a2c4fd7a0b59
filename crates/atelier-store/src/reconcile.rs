//! Gallery reconciliation
//!
//! The filesystem is the ground truth for which media exist; the journal is
//! the ground truth for provenance. These pure functions join the two into
//! the unified gallery view. The view is recomputed wholesale on every
//! change, never incrementally patched.

use atelier_core::models::{GallerySort, LibraryEntry, MediaKind, MediaRecord, UnifiedMediaItem};
use chrono::{DateTime, Utc};

/// Join a filesystem listing against journal records by exact filename.
///
/// Every file present gets a record: journaled files carry their stored
/// provenance, orphans get empty prompt fields, the kind's default
/// subfolder, and `now` as their timestamp. The result is sorted newest
/// first. Pure in its inputs (including `now`), so repeated application
/// with unchanged inputs is byte-identical.
pub fn reconcile(
    kind: MediaKind,
    fs_entries: &[LibraryEntry],
    journal: &[MediaRecord],
    now: DateTime<Utc>,
) -> Vec<MediaRecord> {
    let mut records: Vec<MediaRecord> = fs_entries
        .iter()
        .map(|entry| {
            let meta = journal.iter().find(|r| r.journal_key() == entry.filename);
            match meta {
                Some(meta) => MediaRecord {
                    filename: entry.filename.clone(),
                    subfolder: if meta.subfolder.is_empty() {
                        kind.default_subfolder().to_string()
                    } else {
                        meta.subfolder.clone()
                    },
                    job_id: meta.job_id.clone(),
                    local_path: Some(entry.url.clone()),
                    local_filename: Some(entry.filename.clone()),
                    prompt: meta.prompt.clone(),
                    negative_prompt: meta.negative_prompt.clone(),
                    input_image: meta.input_image.clone(),
                    is_favorite: meta.is_favorite,
                    created_at: meta.created_at,
                },
                None => MediaRecord {
                    filename: entry.filename.clone(),
                    subfolder: kind.default_subfolder().to_string(),
                    job_id: String::new(),
                    local_path: Some(entry.url.clone()),
                    local_filename: Some(entry.filename.clone()),
                    prompt: Some(String::new()),
                    negative_prompt: Some(String::new()),
                    input_image: None,
                    is_favorite: false,
                    created_at: now,
                },
            }
        })
        .collect();

    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records
}

/// Concatenate image and video records into unified items, newest first.
pub fn merge(images: Vec<MediaRecord>, videos: Vec<MediaRecord>) -> Vec<UnifiedMediaItem> {
    let mut items: Vec<UnifiedMediaItem> = images
        .into_iter()
        .map(|r| UnifiedMediaItem::from_record(MediaKind::Image, r))
        .chain(
            videos
                .into_iter()
                .map(|r| UnifiedMediaItem::from_record(MediaKind::Video, r)),
        )
        .collect();

    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items
}

/// Keep only items of `kind`; `None` keeps everything.
pub fn filter_kind(items: Vec<UnifiedMediaItem>, kind: Option<MediaKind>) -> Vec<UnifiedMediaItem> {
    match kind {
        Some(kind) => items.into_iter().filter(|i| i.kind == kind).collect(),
        None => items,
    }
}

/// Sort items by the requested mode. `Favorites` places every favorite
/// before every non-favorite, newest first within each group.
pub fn sort_items(mut items: Vec<UnifiedMediaItem>, sort: GallerySort) -> Vec<UnifiedMediaItem> {
    match sort {
        GallerySort::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        GallerySort::Oldest => items.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        GallerySort::Favorites => items.sort_by(|a, b| {
            b.is_favorite
                .cmp(&a.is_favorite)
                .then(b.created_at.cmp(&a.created_at))
        }),
    }
    items
}
