use std::io::{Cursor, Read};

use super::error::StorageError;
use super::url::BlobUrl;

/// Issues session-scoped, revocable references to binary data.
///
/// A reference stays readable until it is revoked or the runtime (the
/// session) is dropped. References minted by one runtime never resolve in
/// another.
pub trait BlobRuntime: Send + Sync {
    /// Store bytes and return a fresh reference to them.
    fn create(&self, data: &[u8]) -> Result<BlobUrl, StorageError> {
        let mut reader = Cursor::new(data);
        self.create_from_reader(&mut reader)
    }

    /// Store everything `reader` yields and return a fresh reference to it.
    fn create_from_reader(&self, reader: &mut dyn Read) -> Result<BlobUrl, StorageError>;

    /// Read all bytes behind a live reference.
    fn read(&self, url: &BlobUrl) -> Result<Vec<u8>, StorageError>;

    /// Check whether a reference is still live.
    fn is_live(&self, url: &BlobUrl) -> bool;

    /// Revoke a reference.
    ///
    /// Returns `true` if the reference was live. The reference is unusable
    /// afterwards even if freeing the backing data fails.
    fn revoke(&self, url: &BlobUrl) -> bool;

    /// Number of references currently live.
    fn live_count(&self) -> usize;
}

/// Persistent string values addressed by key.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`.
    ///
    /// Returns `true` if the key existed.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;
}
