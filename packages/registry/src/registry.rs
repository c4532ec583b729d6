use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use common::storage::{BlobRuntime, KeyValueStore};
use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, info, instrument, warn};

use crate::blob::BlobHandle;
use crate::display::FileDetails;
use crate::error::{RegistryError, Result};
use crate::event::RegistryEvent;
use crate::filename::{create_unique, download_name};
use crate::id::FileId;
use crate::raw::RawFile;
use crate::record::FileRecord;
use crate::snapshot::{self, PersistedRecord};

/// Ordered collection of file records for one session.
///
/// Every mutation rewrites the full metadata snapshot under `snapshot_key`.
/// Blob references are owned by their records and revoked when a record
/// leaves the registry or the registry is dropped.
pub struct FileRegistry {
    blobs: Arc<dyn BlobRuntime>,
    store: Arc<dyn KeyValueStore>,
    snapshot_key: String,
    records: Vec<FileRecord>,
    subscribers: Vec<Sender<RegistryEvent>>,
}

impl FileRegistry {
    /// Create the session's registry from the snapshot stored under `snapshot_key`.
    ///
    /// A missing, unreadable or malformed snapshot yields an empty registry.
    /// Restored records have no blob.
    pub fn restore(
        blobs: Arc<dyn BlobRuntime>,
        store: Arc<dyn KeyValueStore>,
        snapshot_key: impl Into<String>,
    ) -> Self {
        let snapshot_key = snapshot_key.into();
        let records = load_snapshot(store.as_ref(), &snapshot_key)
            .into_iter()
            .map(FileRecord::from)
            .collect::<Vec<_>>();

        info!(key = %snapshot_key, count = records.len(), "File registry restored");

        Self {
            blobs,
            store,
            snapshot_key,
            records,
            subscribers: Vec::new(),
        }
    }

    pub fn snapshot_key(&self) -> &str {
        &self.snapshot_key
    }

    /// Records in insertion order.
    pub fn files(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &FileId) -> Option<&FileRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Detail view of one record.
    pub fn details(&self, id: &FileId) -> Option<FileDetails> {
        self.get(id)
            .map(|record| FileDetails::describe(record, Utc::now()))
    }

    /// Receive notifications for subsequent operations.
    pub fn subscribe(&mut self) -> Receiver<RegistryEvent> {
        let (tx, rx) = channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Append `files` in order, each with a fresh id and blob reference.
    ///
    /// If any blob allocation fails nothing is appended and the references
    /// already allocated for this batch are revoked.
    #[instrument(skip(self, files))]
    pub fn add(&mut self, files: impl IntoIterator<Item = RawFile>) -> Result<Vec<FileId>> {
        let mut batch = Vec::new();
        for raw in files {
            let blob = {
                let mut reader = raw.open()?;
                BlobHandle::allocate(&self.blobs, &mut *reader)?
            };
            if blob.size() != raw.size() {
                debug!(
                    name = %raw.name(),
                    expected = raw.size(),
                    stored = blob.size(),
                    "File changed while reading"
                );
            }
            let record = FileRecord::new(
                FileId::generate(),
                raw.name().to_string(),
                raw.mime_type(),
                blob.size(),
                Utc::now(),
                Some(blob),
            );
            debug!(id = %record.id(), name = %record.name(), size = record.size_bytes(), "File allocated");
            batch.push(record);
        }

        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<FileId> = batch.iter().map(|r| r.id().clone()).collect();
        self.records.extend(batch);
        self.persist()?;

        info!(count = ids.len(), total = self.records.len(), "Files added");
        self.emit(RegistryEvent::FilesAdded { count: ids.len() });
        Ok(ids)
    }

    /// Remove the record with `id`, revoking its blob.
    ///
    /// Returns `false` (and changes nothing) if no such record exists.
    #[instrument(skip(self), fields(id = %id))]
    pub fn remove(&mut self, id: &FileId) -> Result<bool> {
        let Some(index) = self.records.iter().position(|r| r.id() == id) else {
            debug!("Remove of unknown file ignored");
            return Ok(false);
        };

        let mut record = self.records.remove(index);
        record.release_blob();
        self.persist()?;

        info!(name = %record.name(), remaining = self.records.len(), "File removed");
        self.emit(RegistryEvent::FileRemoved {
            id: record.id().clone(),
            name: record.name().to_string(),
        });
        Ok(true)
    }

    /// Remove every record, revoking all blobs.
    ///
    /// Returns the number of records removed. An empty registry is left
    /// untouched and emits no notification.
    #[instrument(skip(self))]
    pub fn remove_all(&mut self) -> Result<usize> {
        if self.records.is_empty() {
            return Ok(0);
        }

        let count = self.records.len();
        for mut record in self.records.drain(..) {
            record.release_blob();
        }
        self.persist()?;

        info!(count, "All files removed");
        self.emit(RegistryEvent::FilesCleared { count });
        Ok(count)
    }

    /// Save the content of `id` into `dest_dir` under the record's name.
    ///
    /// Existing files are never overwritten; a numbered name is chosen
    /// instead. Returns the written path.
    #[instrument(skip(self, dest_dir), fields(id = %id))]
    pub fn download(&mut self, id: &FileId, dest_dir: &Path) -> Result<PathBuf> {
        let record = self
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        let blob = record
            .blob()
            .filter(|b| b.is_live())
            .ok_or_else(|| RegistryError::BlobUnavailable(id.clone()))?;

        let data = blob.read()?;
        std::fs::create_dir_all(dest_dir)?;
        let (path, mut file) = create_unique(dest_dir, download_name(record.name()))?;
        if let Err(e) = file.write_all(&data).and_then(|()| file.flush()) {
            drop(file);
            let _ = std::fs::remove_file(&path);
            return Err(e.into());
        }

        info!(path = %path.display(), "File downloaded");
        let event = RegistryEvent::DownloadStarted {
            id: record.id().clone(),
            name: record.name().to_string(),
        };
        self.emit(event);
        Ok(path)
    }

    fn persist(&self) -> Result<()> {
        let raw = snapshot::encode(&self.records).map_err(snapshot::SnapshotError::from)?;
        self.store.set(&self.snapshot_key, &raw)?;
        debug!(key = %self.snapshot_key, count = self.records.len(), "Snapshot persisted");
        Ok(())
    }

    fn emit(&mut self, event: RegistryEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

/// Read and decode the stored snapshot, treating every failure as "no prior session".
fn load_snapshot(store: &dyn KeyValueStore, key: &str) -> Vec<PersistedRecord> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "No stored snapshot, starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored snapshot, starting empty");
            return Vec::new();
        }
    };

    match snapshot::decode(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(key, error = %e, "Discarding unreadable snapshot, starting empty");
            Vec::new()
        }
    }
}
