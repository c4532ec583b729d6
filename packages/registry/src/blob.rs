use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use common::storage::{BlobRuntime, BlobUrl, StorageError};
use tracing::debug;

/// Owning guard for one live blob reference.
///
/// The reference is revoked exactly once: by [`BlobHandle::release`], or
/// when the handle is dropped.
pub struct BlobHandle {
    runtime: Arc<dyn BlobRuntime>,
    url: BlobUrl,
    size: u64,
    released: bool,
}

/// Counts the bytes that pass through it.
struct Counted<'a> {
    inner: &'a mut dyn Read,
    bytes: u64,
}

impl Read for Counted<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.bytes += n as u64;
        Ok(n)
    }
}

impl BlobHandle {
    /// Allocate a new reference holding everything `reader` yields.
    pub fn allocate(
        runtime: &Arc<dyn BlobRuntime>,
        reader: &mut dyn Read,
    ) -> Result<Self, StorageError> {
        let mut counted = Counted {
            inner: reader,
            bytes: 0,
        };
        let url = runtime.create_from_reader(&mut counted)?;
        Ok(Self {
            runtime: Arc::clone(runtime),
            url,
            size: counted.bytes,
            released: false,
        })
    }

    /// Number of bytes stored in the blob.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn url(&self) -> &BlobUrl {
        &self.url
    }

    pub fn is_live(&self) -> bool {
        !self.released && self.runtime.is_live(&self.url)
    }

    /// Read the referenced bytes.
    pub fn read(&self) -> Result<Vec<u8>, StorageError> {
        self.runtime.read(&self.url)
    }

    /// Revoke the reference now.
    pub fn release(mut self) {
        self.revoke();
    }

    fn revoke(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if self.runtime.revoke(&self.url) {
            debug!(url = %self.url, "Blob reference revoked");
        }
    }
}

impl Drop for BlobHandle {
    fn drop(&mut self) {
        self.revoke();
    }
}

impl fmt::Debug for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobHandle")
            .field("url", &self.url)
            .field("size", &self.size)
            .field("released", &self.released)
            .finish()
    }
}
