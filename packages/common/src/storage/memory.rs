use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use super::error::StorageError;
use super::traits::{BlobRuntime, KeyValueStore};
use super::url::BlobUrl;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Blob runtime that keeps every live blob in memory.
pub struct MemoryBlobRuntime {
    session: Uuid,
    max_size: u64,
    blobs: Mutex<HashMap<BlobUrl, Arc<[u8]>>>,
}

impl MemoryBlobRuntime {
    /// Create a runtime for a fresh session.
    pub fn new(max_size: u64) -> Self {
        Self {
            session: Uuid::new_v4(),
            max_size,
            blobs: Mutex::new(HashMap::new()),
        }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }
}

impl Default for MemoryBlobRuntime {
    fn default() -> Self {
        Self::new(u64::MAX)
    }
}

impl BlobRuntime for MemoryBlobRuntime {
    fn create_from_reader(&self, reader: &mut dyn Read) -> Result<BlobUrl, StorageError> {
        let mut data = Vec::new();
        // Read one byte past the limit so oversize input is detected without
        // buffering all of it.
        let read = reader
            .take(self.max_size.saturating_add(1))
            .read_to_end(&mut data)? as u64;
        if read > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: read,
                limit: self.max_size,
            });
        }

        let url = BlobUrl::mint(self.session);
        lock(&self.blobs).insert(url, data.into());
        Ok(url)
    }

    fn read(&self, url: &BlobUrl) -> Result<Vec<u8>, StorageError> {
        lock(&self.blobs)
            .get(url)
            .map(|data| data.to_vec())
            .ok_or_else(|| StorageError::NotFound(url.to_string()))
    }

    fn is_live(&self, url: &BlobUrl) -> bool {
        lock(&self.blobs).contains_key(url)
    }

    fn revoke(&self, url: &BlobUrl) -> bool {
        lock(&self.blobs).remove(url).is_some()
    }

    fn live_count(&self) -> usize {
        lock(&self.blobs).len()
    }
}

/// In-memory key-value store.
///
/// Clones share the same map, so a clone handed to a second registry behaves
/// like the same store seen after a process restart.
#[derive(Clone, Default)]
pub struct MemoryKeyValueStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        Ok(lock(&self.values).remove(key).is_some())
    }
}
