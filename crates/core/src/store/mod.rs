pub mod schema;

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{CatalogRecord, RecordUpdate};
use crate::error::Result;

const SELECT_COLUMNS: &str = "id, image_path, title, description, timestamp, location_name, \
     farmer_name, additional_details, cloudinary_url, public_id, plant_disease";

/// SQLite-backed store for catalog records.
///
/// Operations are synchronous on the caller's thread; writes are serialized
/// by SQLite's single-writer locking.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a store at the given path with WAL mode, migrating it
    /// to the current schema. A migration failure leaves the store unusable
    /// and must abort startup.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        schema::setup(&mut conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        schema::setup(&mut conn)?;
        Ok(Self { conn })
    }

    /// Insert a new record; the `id` field of the argument is ignored.
    /// Returns the store-assigned id.
    pub fn insert(&self, record: &CatalogRecord) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO images (image_path, title, description, timestamp, location_name,
             farmer_name, additional_details, cloudinary_url, public_id, plant_disease)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.media_path,
                record.title,
                record.note,
                record.timestamp_ms,
                record.location,
                record.owner,
                record.details,
                record.remote_url,
                record.remote_public_id,
                record.category,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Single-record lookup. An unknown or deleted id yields `None`, not an
    /// error.
    pub fn get(&self, id: i64) -> Result<Option<CatalogRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM images WHERE id = ?1"),
                params![id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// All records, most recent first; ties broken by insertion order.
    pub fn list(&self) -> Result<Vec<CatalogRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM images ORDER BY timestamp DESC, id DESC"
        ))?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Replace exactly the display fields; `image_path`, `cloudinary_url`
    /// and `public_id` are never touched. Returns false when no row matches.
    pub fn update_details(&self, id: i64, update: &RecordUpdate) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE images SET title = ?1, description = ?2, farmer_name = ?3,
             additional_details = ?4, plant_disease = ?5, location_name = ?6, timestamp = ?7
             WHERE id = ?8",
            params![
                update.title,
                update.note,
                update.owner,
                update.details,
                update.category,
                update.location,
                update.timestamp_ms,
                id,
            ],
        )?;
        Ok(rows > 0)
    }

    /// Remove the row unconditionally. Returns false when no row existed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM images WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<CatalogRecord> {
    Ok(CatalogRecord {
        id: row.get(0)?,
        media_path: row.get(1)?,
        title: row.get(2)?,
        note: row.get(3)?,
        timestamp_ms: row.get(4)?,
        location: row.get(5)?,
        owner: row.get(6)?,
        details: row.get(7)?,
        remote_url: row.get(8)?,
        remote_public_id: row.get(9)?,
        category: row.get(10)?,
    })
}
