//! Persisted form of the registry: a JSON array of file metadata.
//!
//! ```json
//! [{"id":"…","name":"report.pdf","type":"application/pdf","size":2048,"createdAt":"2024-05-01T12:00:00Z"}]
//! ```
//!
//! Blob references are never written; they cannot outlive the session.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::FileId;
use crate::record::FileRecord;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate file id in snapshot: {0}")]
    DuplicateId(FileId),
}

/// Metadata of one record as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub id: FileId,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<&FileRecord> for PersistedRecord {
    fn from(record: &FileRecord) -> Self {
        Self {
            id: record.id().clone(),
            name: record.name().to_string(),
            mime_type: record.mime_type().to_string(),
            size: record.size_bytes(),
            created_at: record.created_at(),
        }
    }
}

impl From<PersistedRecord> for FileRecord {
    fn from(persisted: PersistedRecord) -> Self {
        FileRecord::new(
            persisted.id,
            persisted.name,
            Some(&persisted.mime_type),
            persisted.size,
            persisted.created_at,
            None,
        )
    }
}

/// Serialize the metadata of `records`, in order.
pub fn encode(records: &[FileRecord]) -> Result<String, serde_json::Error> {
    let persisted: Vec<PersistedRecord> = records.iter().map(PersistedRecord::from).collect();
    serde_json::to_string(&persisted)
}

/// Parse a stored snapshot.
pub fn decode(raw: &str) -> Result<Vec<PersistedRecord>, SnapshotError> {
    let records: Vec<PersistedRecord> = serde_json::from_str(raw)?;

    let mut seen = HashSet::with_capacity(records.len());
    for record in &records {
        if !seen.insert(&record.id) {
            return Err(SnapshotError::DuplicateId(record.id.clone()));
        }
    }

    Ok(records)
}
