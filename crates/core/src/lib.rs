pub mod config;
pub mod domain;
pub mod error;
pub mod remote;
pub mod search;
pub mod store;
pub mod sync;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use domain::{CatalogRecord, RecordUpdate};
use error::Result;
use remote::RemoteHost;
use store::Store;
use sync::SyncEngine;

/// The main entry point: a local catalog of field images plus its
/// best-effort remote metadata mirror.
///
/// Reads always come from the local store; the remote host only mirrors
/// selected display attributes for external discovery and is never the
/// source of truth.
pub struct Catalog {
    store: Store,
    sync: SyncEngine,
}

impl Catalog {
    /// Open or create a catalog at the given database path, migrating the
    /// store to the current schema. A migration failure here must abort
    /// startup; the store is not usable.
    pub fn open(db_path: &Path, remote: Arc<dyn RemoteHost>) -> Result<Self> {
        Ok(Self {
            store: Store::open(db_path)?,
            sync: SyncEngine::new(remote),
        })
    }

    /// Open an in-memory catalog (for testing).
    pub fn open_in_memory(remote: Arc<dyn RemoteHost>) -> Result<Self> {
        Ok(Self {
            store: Store::open_in_memory()?,
            sync: SyncEngine::new(remote),
        })
    }

    /// Insert a record as-is, without uploading. Used when the image already
    /// lives on the host (so the draft carries its remote identity) or stays
    /// local-only. Returns the store-assigned id.
    pub fn create(&self, record: &CatalogRecord) -> Result<i64> {
        self.store.insert(record)
    }

    /// Upload the image bytes, then insert the record carrying the
    /// host-assigned identity. The upload is synchronous on the caller's
    /// thread: a record never exists locally while its initial upload is
    /// still in flight, and an upload failure leaves no local row.
    pub fn create_with_upload(&self, bytes: &[u8], mut record: CatalogRecord) -> Result<i64> {
        let asset = self.sync.upload_new(bytes, &record)?;
        record.remote_url = Some(asset.url);
        record.remote_public_id = Some(asset.public_id);
        self.store.insert(&record)
    }

    /// Single-record lookup; `None` for an unknown or deleted id.
    pub fn record(&self, id: i64) -> Result<Option<CatalogRecord>> {
        self.store.get(id)
    }

    /// All records, most recent first.
    pub fn records(&self) -> Result<Vec<CatalogRecord>> {
        self.store.list()
    }

    /// Case-insensitive search over titles and notes.
    pub fn search(&self, query: &str) -> Result<Vec<CatalogRecord>> {
        let records = self.store.list()?;
        Ok(search::filter_records(&records, query)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Replace a record's display fields. When the record is mirrored
    /// remotely, exactly one metadata push with the refreshed fields is
    /// queued; its outcome never affects the local result. Returns false
    /// when no row matches.
    pub fn update(&self, id: i64, update: &RecordUpdate) -> Result<bool> {
        if !self.store.update_details(id, update)? {
            return Ok(false);
        }
        if let Some(record) = self.store.get(id)? {
            if record.remote_public_id.is_some() {
                self.sync.push_update(&record);
            }
        }
        Ok(true)
    }

    /// Delete a record locally, then queue a best-effort remote destroy when
    /// it carried a public id. Returns false when no row existed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let Some(record) = self.store.get(id)? else {
            return Ok(false);
        };
        if !self.store.delete(id)? {
            return Ok(false);
        }
        if let Some(public_id) = record.remote_public_id.filter(|p| !p.is_empty()) {
            self.sync.push_destroy(public_id);
        }
        Ok(true)
    }

    /// Queue one metadata push per mirrored record. Each push succeeds or
    /// fails independently; only the dispatch count is returned.
    pub fn resync_all(&self) -> Result<usize> {
        Ok(self.sync.resync_all(&self.store.list()?))
    }

    /// Read the metadata bundle currently stored on the host for an asset.
    pub fn remote_context(&self, public_id: &str) -> Result<BTreeMap<String, String>> {
        self.sync.fetch_context(public_id)
    }
}
