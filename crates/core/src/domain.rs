use serde::{Deserialize, Serialize};

/// One cataloged field image with its display metadata and remote linkage.
///
/// `id` is assigned by the store at insert time and never reused.
/// `remote_public_id` is the host's join key for the mirrored metadata; it is
/// set at most once (on the first successful upload) and never touched by an
/// edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: i64,
    /// Local image path, or the remote URL when no local copy exists.
    pub media_path: String,
    pub title: Option<String>,
    pub note: String,
    /// Capture or creation time as epoch milliseconds. Set once at creation,
    /// changed only by an explicit edit.
    pub timestamp_ms: i64,
    pub location: Option<String>,
    pub owner: Option<String>,
    pub details: Option<String>,
    pub remote_url: Option<String>,
    pub remote_public_id: Option<String>,
    pub category: Option<String>,
}

/// The display fields an edit replaces. Identity and remote linkage
/// (`media_path`, `remote_url`, `remote_public_id`) are never part of an
/// edit.
#[derive(Debug, Clone, Default)]
pub struct RecordUpdate {
    pub title: Option<String>,
    pub note: String,
    pub owner: Option<String>,
    pub details: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub timestamp_ms: i64,
}

impl RecordUpdate {
    /// An update carrying the record's current display fields unchanged.
    pub fn from_record(record: &CatalogRecord) -> Self {
        Self {
            title: record.title.clone(),
            note: record.note.clone(),
            owner: record.owner.clone(),
            details: record.details.clone(),
            category: record.category.clone(),
            location: record.location.clone(),
            timestamp_ms: record.timestamp_ms,
        }
    }
}
