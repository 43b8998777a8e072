//! Best-effort mirroring of local mutations into the remote host.
//!
//! Edits and deletes are queued and worked off by a small fixed pool of
//! background threads; the caller never waits and never sees a remote
//! failure. The one exception is the initial upload, which runs on the
//! caller's thread so a record never exists locally before its remote
//! identity does.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{Local, TimeZone};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, warn};

use crate::domain::CatalogRecord;
use crate::error::Result;
use crate::remote::{AttributeBundle, RemoteAsset, RemoteHost};

/// Queued jobs beyond this are shed (with a warning) rather than blocking
/// the caller.
const QUEUE_CAPACITY: usize = 64;
const WORKERS: usize = 2;
/// Attempts per job before giving up; only remote failures are retried.
const MAX_ATTEMPTS: u32 = 3;
/// Backoff before the first retry; doubles per attempt.
const INITIAL_BACKOFF: Duration = Duration::from_millis(200);

/// Timestamp shape pushed with metadata updates.
const UPDATE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Timestamp shape used by the initial upload. The two call sites have
/// always disagreed; both shapes are preserved as-is.
const UPLOAD_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M";

enum Job {
    UpdateContext {
        public_id: String,
        bundle: AttributeBundle,
    },
    Destroy {
        public_id: String,
    },
}

impl Job {
    fn kind(&self) -> &'static str {
        match self {
            Job::UpdateContext { .. } => "update-context",
            Job::Destroy { .. } => "destroy",
        }
    }

    fn public_id(&self) -> &str {
        match self {
            Job::UpdateContext { public_id, .. } | Job::Destroy { public_id } => public_id,
        }
    }
}

/// Pushes local mutations to the remote host without blocking callers.
pub struct SyncEngine {
    remote: Arc<dyn RemoteHost>,
    queue: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl SyncEngine {
    pub fn new(remote: Arc<dyn RemoteHost>) -> Self {
        let (tx, rx) = bounded::<Job>(QUEUE_CAPACITY);
        let workers = (0..WORKERS)
            .map(|_| {
                let rx: Receiver<Job> = rx.clone();
                let remote = Arc::clone(&remote);
                thread::spawn(move || {
                    for job in rx.iter() {
                        run_with_retry(remote.as_ref(), &job);
                    }
                })
            })
            .collect();
        Self {
            remote,
            queue: Some(tx),
            workers,
        }
    }

    /// Upload new image bytes ahead of the local insert. Synchronous: an
    /// upload failure must abort the creation, leaving no local row.
    ///
    /// The bundle's timestamp is the current wall clock in the upload shape,
    /// not the record's own timestamp.
    pub fn upload_new(&self, bytes: &[u8], record: &CatalogRecord) -> Result<RemoteAsset> {
        let mut bundle = bundle_for(record);
        bundle.timestamp = Local::now().format(UPLOAD_TIMESTAMP_FORMAT).to_string();
        self.remote.upload(bytes, &bundle)
    }

    /// Queue one metadata push carrying the record's display fields as of
    /// this call. Returns immediately; the outcome is only logged.
    pub fn push_update(&self, record: &CatalogRecord) {
        let Some(public_id) = record.remote_public_id.clone() else {
            return;
        };
        self.dispatch(Job::UpdateContext {
            public_id,
            bundle: bundle_for(record),
        });
    }

    /// Queue a best-effort remote destroy for a deleted record.
    pub fn push_destroy(&self, public_id: String) {
        self.dispatch(Job::Destroy { public_id });
    }

    /// One push per record that carries both a remote URL and a public id.
    /// Each push succeeds or fails independently; only the dispatch count is
    /// reported.
    pub fn resync_all(&self, records: &[CatalogRecord]) -> usize {
        let mut dispatched = 0;
        for record in records {
            if record.remote_url.is_some() && record.remote_public_id.is_some() {
                self.push_update(record);
                dispatched += 1;
            }
        }
        dispatched
    }

    /// Read the metadata bundle currently stored on the host. Synchronous;
    /// the remote is never the source of truth for record content.
    pub fn fetch_context(&self, public_id: &str) -> Result<BTreeMap<String, String>> {
        self.remote.fetch_context(public_id)
    }

    fn dispatch(&self, job: Job) {
        let Some(queue) = &self.queue else { return };
        match queue.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(job)) => {
                warn!(
                    kind = job.kind(),
                    public_id = job.public_id(),
                    "sync queue full, dropping push"
                );
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

impl Drop for SyncEngine {
    /// Disconnect the queue and join the workers, draining queued jobs.
    fn drop(&mut self) {
        self.queue.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn run_with_retry(remote: &dyn RemoteHost, job: &Job) {
    let mut backoff = INITIAL_BACKOFF;
    for attempt in 1..=MAX_ATTEMPTS {
        match run(remote, job) {
            Ok(()) => {
                debug!(
                    kind = job.kind(),
                    public_id = job.public_id(),
                    "remote push succeeded"
                );
                return;
            }
            Err(err) if attempt < MAX_ATTEMPTS => {
                warn!(
                    kind = job.kind(),
                    public_id = job.public_id(),
                    attempt,
                    %err,
                    "remote push failed, retrying"
                );
                thread::sleep(backoff);
                backoff *= 2;
            }
            Err(err) => {
                warn!(
                    kind = job.kind(),
                    public_id = job.public_id(),
                    %err,
                    "remote push failed, giving up"
                );
            }
        }
    }
}

fn run(remote: &dyn RemoteHost, job: &Job) -> Result<()> {
    match job {
        Job::UpdateContext { public_id, bundle } => remote.update_context(public_id, bundle),
        Job::Destroy { public_id } => remote.destroy(public_id),
    }
}

/// Bundle a record's display fields for the host. Absent optional fields
/// mirror as empty strings.
pub(crate) fn bundle_for(record: &CatalogRecord) -> AttributeBundle {
    AttributeBundle {
        alt: record.note.clone(),
        farmer_name: record.owner.clone().unwrap_or_default(),
        plant_name: record.title.clone().unwrap_or_default(),
        disease: record.category.clone().unwrap_or_default(),
        location: record.location.clone().unwrap_or_default(),
        details: record.details.clone().unwrap_or_default(),
        timestamp: format_timestamp_ms(record.timestamp_ms),
    }
}

fn format_timestamp_ms(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .earliest()
        .map(|dt| dt.format(UPDATE_TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}
