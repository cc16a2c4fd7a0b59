//! Atelier Store Library
//!
//! JSON-file-backed persistence for the studio: the media metadata journal,
//! the voice registry, the media library directory tree, and the pure
//! gallery-reconciliation functions.
//!
//! All stores follow a full-read, in-memory-modify, full-write pattern with
//! a single-active-writer assumption (one local client). Last writer wins.

mod error;
mod journal;
mod library;
mod reconcile;
mod voices;

pub use error::{StoreError, StoreResult};
pub use journal::{MediaJournal, MAX_JOURNAL_RECORDS};
pub use library::{MediaLibrary, StoredMedia};
pub use reconcile::{filter_kind, merge, reconcile, sort_items};
pub use voices::{VoiceRegistry, VoiceUpload};
