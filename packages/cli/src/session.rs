use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use common::StorageConfig;
use common::storage::filesystem::{FilesystemBlobRuntime, FilesystemKeyValueStore};
use crossbeam::channel::Receiver;
use registry::{FileId, FileRegistry, RegistryEvent};
use tracing::info;

/// Application root for one run of the program.
///
/// Owns the registry; the blob runtime lives as long as the registry does,
/// so all session blobs are gone once the session is dropped.
pub struct Session {
    registry: FileRegistry,
    events: Receiver<RegistryEvent>,
    download_dir: PathBuf,
}

impl Session {
    pub fn open(storage: &StorageConfig, download_dir: &Path) -> Result<Self> {
        let store = FilesystemKeyValueStore::new(storage.store_dir(), storage.max_value_size)
            .with_context(|| {
                format!("Failed to open store at {}", storage.store_dir().display())
            })?;
        let blobs = FilesystemBlobRuntime::new(&storage.sessions_dir(), storage.max_blob_size)
            .context("Failed to start blob session")?;
        info!(session = %blobs.session(), data_dir = %storage.data_dir.display(), "Session opened");

        let mut registry =
            FileRegistry::restore(Arc::new(blobs), Arc::new(store), &storage.snapshot_key);
        let events = registry.subscribe();

        Ok(Self {
            registry,
            events,
            download_dir: download_dir.to_path_buf(),
        })
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FileRegistry {
        &mut self.registry
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Notifications emitted since the last call.
    pub fn drain_events(&self) -> Vec<RegistryEvent> {
        self.events.try_iter().collect()
    }

    /// Resolve user input to a record id: an exact id, or a unique id prefix.
    ///
    /// Anything else is passed through unchanged so lookups report it as missing.
    pub fn resolve_id(&self, input: &str) -> FileId {
        let mut matches = self
            .registry
            .files()
            .iter()
            .map(|r| r.id())
            .filter(|id| id.as_str().starts_with(input));

        match (matches.next(), matches.next()) {
            (Some(id), None) => id.clone(),
            _ => FileId::from(input),
        }
    }
}
