use std::sync::Arc;

use common::storage::KeyValueStore;
use common::storage::memory::{MemoryBlobRuntime, MemoryKeyValueStore};
use registry::snapshot::{self, PersistedRecord};
use registry::{FileRegistry, RawFile};

pub const KEY: &str = "fileStorage";

/// One session: its own blob runtime, sharing the store with later sessions.
pub struct TestSession {
    pub blobs: Arc<MemoryBlobRuntime>,
    pub store: MemoryKeyValueStore,
    pub registry: FileRegistry,
}

impl TestSession {
    pub fn start() -> Self {
        Self::resume(MemoryKeyValueStore::new())
    }

    /// Start a new session over an existing store, like a process restart.
    pub fn resume(store: MemoryKeyValueStore) -> Self {
        let blobs = Arc::new(MemoryBlobRuntime::default());
        let registry = FileRegistry::restore(blobs.clone(), Arc::new(store.clone()), KEY);
        Self {
            blobs,
            store,
            registry,
        }
    }

    /// End this session and start the next one over the same store.
    pub fn restart(self) -> Self {
        let store = self.store.clone();
        drop(self);
        Self::resume(store)
    }

    pub fn stored_raw(&self) -> Option<String> {
        self.store.get(KEY).unwrap()
    }

    pub fn stored(&self) -> Option<Vec<PersistedRecord>> {
        self.store
            .get(KEY)
            .unwrap()
            .map(|raw| snapshot::decode(&raw).unwrap())
    }

    /// In-memory records reduced to their persisted form.
    pub fn in_memory(&self) -> Vec<PersistedRecord> {
        self.registry
            .files()
            .iter()
            .map(PersistedRecord::from)
            .collect()
    }
}

pub fn text_file(name: &str) -> RawFile {
    RawFile::from_bytes(name, Some("text/plain".into()), name.as_bytes().to_vec())
}
