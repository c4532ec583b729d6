use chrono::{DateTime, Utc};
use common::storage::BlobUrl;

use crate::blob::BlobHandle;
use crate::id::FileId;

/// Content type used when the source file declares none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// One file known to the registry.
///
/// Records are only created by the registry, either from an upload or from
/// a restored snapshot. Restored records carry no blob.
#[derive(Debug)]
pub struct FileRecord {
    id: FileId,
    name: String,
    mime_type: String,
    size_bytes: u64,
    created_at: DateTime<Utc>,
    blob: Option<BlobHandle>,
}

impl FileRecord {
    pub(crate) fn new(
        id: FileId,
        name: String,
        mime_type: Option<&str>,
        size_bytes: u64,
        created_at: DateTime<Utc>,
        blob: Option<BlobHandle>,
    ) -> Self {
        let mime_type = match mime_type.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => DEFAULT_MIME_TYPE.to_string(),
        };

        Self {
            id,
            name,
            mime_type,
            size_bytes,
            created_at,
            blob,
        }
    }

    pub fn id(&self) -> &FileId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn blob(&self) -> Option<&BlobHandle> {
        self.blob.as_ref()
    }

    /// URL of the live blob, if this record still has one.
    pub fn blob_url(&self) -> Option<&BlobUrl> {
        self.blob.as_ref().filter(|b| b.is_live()).map(BlobHandle::url)
    }

    /// Revoke the blob now instead of waiting for drop.
    pub(crate) fn release_blob(&mut self) {
        if let Some(blob) = self.blob.take() {
            blob.release();
        }
    }
}
