use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use cropcatalog_core::domain::{CatalogRecord, RecordUpdate};
use cropcatalog_core::error::{Error, Result};
use cropcatalog_core::remote::{AttributeBundle, RemoteAsset, RemoteHost};
use cropcatalog_core::Catalog;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Upload { context: String },
    UpdateContext { public_id: String, context: String },
    Destroy { public_id: String },
}

/// Remote host double that records calls; uploads can be made to fail.
#[derive(Default)]
struct RecordingHost {
    calls: Mutex<Vec<Call>>,
    fail_uploads: bool,
}

impl RecordingHost {
    fn failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl RemoteHost for RecordingHost {
    fn upload(&self, _bytes: &[u8], bundle: &AttributeBundle) -> Result<RemoteAsset> {
        if self.fail_uploads {
            return Err(Error::Remote("host unavailable".to_string()));
        }
        self.calls.lock().unwrap().push(Call::Upload {
            context: bundle.encode(),
        });
        Ok(RemoteAsset {
            public_id: "asset-1".to_string(),
            url: "https://host.example/asset-1.jpg".to_string(),
        })
    }

    fn update_context(&self, public_id: &str, bundle: &AttributeBundle) -> Result<()> {
        self.calls.lock().unwrap().push(Call::UpdateContext {
            public_id: public_id.to_string(),
            context: bundle.encode(),
        });
        Ok(())
    }

    fn fetch_context(&self, _public_id: &str) -> Result<BTreeMap<String, String>> {
        let mut bundle = BTreeMap::new();
        bundle.insert("alt".to_string(), "Blight".to_string());
        Ok(bundle)
    }

    fn destroy(&self, public_id: &str) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Destroy {
            public_id: public_id.to_string(),
        });
        Ok(())
    }
}

fn draft() -> CatalogRecord {
    CatalogRecord {
        id: 0,
        media_path: "/tmp/tomato.jpg".to_string(),
        title: Some("Tomato".to_string()),
        note: "Blight".to_string(),
        timestamp_ms: 1700000000000,
        location: Some("Field 3".to_string()),
        owner: Some("A".to_string()),
        details: None,
        remote_url: None,
        remote_public_id: None,
        category: Some("Early blight".to_string()),
    }
}

// ── Creation ─────────────────────────────────────────────────────

#[test]
fn test_create_and_get_roundtrip() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host.clone()).unwrap();

    let record = draft();
    let id = catalog.create(&record).unwrap();
    let fetched = catalog.record(id).unwrap().unwrap();
    assert_eq!(fetched, CatalogRecord { id, ..record });
}

#[test]
fn test_create_without_remote_identity_triggers_no_remote_calls() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host.clone()).unwrap();

    catalog.create(&draft()).unwrap();
    drop(catalog);

    assert!(host.calls().is_empty());
}

#[test]
fn test_create_with_upload_links_remote_identity_atomically() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host.clone()).unwrap();

    let id = catalog.create_with_upload(b"jpeg bytes", draft()).unwrap();

    let record = catalog.record(id).unwrap().unwrap();
    assert_eq!(record.remote_public_id.as_deref(), Some("asset-1"));
    assert_eq!(
        record.remote_url.as_deref(),
        Some("https://host.example/asset-1.jpg")
    );
    // The upload happened before the insert, on the caller's thread.
    assert!(matches!(host.calls()[0], Call::Upload { .. }));
}

#[test]
fn test_failed_upload_leaves_no_local_row() {
    let host = Arc::new(RecordingHost::failing_uploads());
    let catalog = Catalog::open_in_memory(host.clone()).unwrap();

    let err = catalog
        .create_with_upload(b"jpeg bytes", draft())
        .unwrap_err();
    assert!(matches!(err, Error::Remote(_)));
    assert!(catalog.records().unwrap().is_empty());
}

// ── The concrete scenario ────────────────────────────────────────

#[test]
fn test_tomato_scenario() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host.clone()).unwrap();

    let id = catalog.create(&draft()).unwrap();

    let all = catalog.records().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    assert_eq!(all[0].title.as_deref(), Some("Tomato"));
    assert_eq!(all[0].note, "Blight");
    assert_eq!(all[0].owner.as_deref(), Some("A"));
    assert_eq!(all[0].category.as_deref(), Some("Early blight"));
    assert_eq!(all[0].location.as_deref(), Some("Field 3"));
    assert_eq!(all[0].timestamp_ms, 1700000000000);

    let mut update = RecordUpdate::from_record(&all[0]);
    update.title = Some("Tomato Plant".to_string());
    assert!(catalog.update(id, &update).unwrap());
    assert_eq!(
        catalog.record(id).unwrap().unwrap().title.as_deref(),
        Some("Tomato Plant")
    );
}

// ── Update and sync ──────────────────────────────────────────────

#[test]
fn test_update_of_mirrored_record_queues_one_push_with_refreshed_fields() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host.clone()).unwrap();
    let id = catalog.create_with_upload(b"jpeg bytes", draft()).unwrap();

    let mut update = RecordUpdate::from_record(&catalog.record(id).unwrap().unwrap());
    update.title = Some("Tomato Plant".to_string());
    assert!(catalog.update(id, &update).unwrap());
    drop(catalog);

    let pushes: Vec<Call> = host
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::UpdateContext { .. }))
        .collect();
    assert_eq!(pushes.len(), 1);
    match &pushes[0] {
        Call::UpdateContext { public_id, context } => {
            assert_eq!(public_id, "asset-1");
            assert!(context.contains("plant_name=Tomato Plant"));
            assert!(context.contains("alt=Blight"));
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[test]
fn test_update_of_local_only_record_queues_no_push() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host.clone()).unwrap();
    let id = catalog.create(&draft()).unwrap();

    let update = RecordUpdate::from_record(&catalog.record(id).unwrap().unwrap());
    assert!(catalog.update(id, &update).unwrap());
    drop(catalog);

    assert!(host.calls().is_empty());
}

#[test]
fn test_update_unknown_id_returns_false_without_push() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host.clone()).unwrap();

    let update = RecordUpdate {
        note: "x".to_string(),
        ..RecordUpdate::default()
    };
    assert!(!catalog.update(999, &update).unwrap());
    drop(catalog);

    assert!(host.calls().is_empty());
}

#[test]
fn test_update_preserves_remote_linkage() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host.clone()).unwrap();
    let id = catalog.create_with_upload(b"jpeg bytes", draft()).unwrap();

    let mut update = RecordUpdate::from_record(&catalog.record(id).unwrap().unwrap());
    update.note = "edited".to_string();
    catalog.update(id, &update).unwrap();

    let record = catalog.record(id).unwrap().unwrap();
    assert_eq!(record.media_path, "/tmp/tomato.jpg");
    assert_eq!(record.remote_public_id.as_deref(), Some("asset-1"));
    assert_eq!(
        record.remote_url.as_deref(),
        Some("https://host.example/asset-1.jpg")
    );
}

// ── Delete ───────────────────────────────────────────────────────

#[test]
fn test_delete_mirrored_record_queues_exactly_one_destroy() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host.clone()).unwrap();
    let id = catalog.create_with_upload(b"jpeg bytes", draft()).unwrap();

    assert!(catalog.delete(id).unwrap());
    assert!(catalog.record(id).unwrap().is_none());
    drop(catalog);

    let destroys: Vec<Call> = host
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Destroy { .. }))
        .collect();
    assert_eq!(
        destroys,
        vec![Call::Destroy {
            public_id: "asset-1".to_string()
        }]
    );
}

#[test]
fn test_delete_local_only_record_queues_no_destroy() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host.clone()).unwrap();
    let id = catalog.create(&draft()).unwrap();

    assert!(catalog.delete(id).unwrap());
    drop(catalog);

    assert!(host.calls().is_empty());
}

#[test]
fn test_delete_unknown_id_returns_false() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host).unwrap();
    assert!(!catalog.delete(999).unwrap());
}

#[test]
fn test_delete_with_empty_public_id_queues_no_destroy() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host.clone()).unwrap();

    let mut record = draft();
    record.remote_public_id = Some(String::new());
    let id = catalog.create(&record).unwrap();

    assert!(catalog.delete(id).unwrap());
    drop(catalog);

    assert!(host.calls().is_empty());
}

// ── Search ───────────────────────────────────────────────────────

#[test]
fn test_search_matches_title_substring() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host).unwrap();

    let mut rust_spot = draft();
    rust_spot.title = Some("Rust spot".to_string());
    let mut healthy = draft();
    healthy.title = Some("Healthy leaf".to_string());
    catalog.create(&rust_spot).unwrap();
    catalog.create(&healthy).unwrap();

    let hits = catalog.search("rust").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title.as_deref(), Some("Rust spot"));
}

#[test]
fn test_search_empty_query_is_unfiltered() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host).unwrap();
    catalog.create(&draft()).unwrap();
    catalog.create(&draft()).unwrap();

    assert_eq!(catalog.search("").unwrap().len(), 2);
}

// ── Resync ───────────────────────────────────────────────────────

#[test]
fn test_resync_all_pushes_only_mirrored_records() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host.clone()).unwrap();

    catalog.create_with_upload(b"jpeg bytes", draft()).unwrap();
    catalog.create(&draft()).unwrap();

    let dispatched = catalog.resync_all().unwrap();
    assert_eq!(dispatched, 1);
    drop(catalog);

    let pushes: Vec<Call> = host
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::UpdateContext { .. }))
        .collect();
    assert_eq!(pushes.len(), 1);
}

// ── Remote context read-back ─────────────────────────────────────

#[test]
fn test_remote_context_passthrough() {
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open_in_memory(host).unwrap();

    let bundle = catalog.remote_context("asset-1").unwrap();
    assert_eq!(bundle.get("alt").map(String::as_str), Some("Blight"));
}

// ── Persistence ──────────────────────────────────────────────────

#[test]
fn test_open_creates_parent_directories_and_persists() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("sub/dir/catalog.db");

    let id;
    {
        let host = Arc::new(RecordingHost::default());
        let catalog = Catalog::open(&db_path, host).unwrap();
        id = catalog.create(&draft()).unwrap();
    }
    assert!(db_path.exists());

    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::open(&db_path, host).unwrap();
    assert_eq!(catalog.record(id).unwrap().unwrap().note, "Blight");
}
