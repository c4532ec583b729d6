use common::storage::StorageError;
use thiserror::Error;

use crate::id::FileId;
use crate::snapshot::SnapshotError;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("File not found: {0}")]
    NotFound(FileId),

    /// The record has no live blob, e.g. it was restored from a previous session.
    #[error("File content unavailable in this session: {0}")]
    BlobUnavailable(FileId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
