use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use super::error::StorageError;

const SCHEME: &str = "blob:";

/// A session-scoped blob reference: `blob:{session}/{blob}`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobUrl {
    session: Uuid,
    blob: Uuid,
}

impl BlobUrl {
    /// Mint a new reference inside `session`.
    pub fn mint(session: Uuid) -> Self {
        Self {
            session,
            blob: Uuid::now_v7(),
        }
    }

    /// The session that issued this reference.
    pub fn session(&self) -> Uuid {
        self.session
    }

    /// The per-blob part of the reference.
    pub fn blob_id(&self) -> Uuid {
        self.blob
    }
}

impl FromStr for BlobUrl {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(SCHEME)
            .ok_or_else(|| StorageError::InvalidBlobUrl(format!("missing '{SCHEME}' scheme")))?;

        let (session, blob) = rest
            .split_once('/')
            .ok_or_else(|| StorageError::InvalidBlobUrl("missing '/' separator".into()))?;

        let session = Uuid::parse_str(session)
            .map_err(|e| StorageError::InvalidBlobUrl(format!("invalid session id: {e}")))?;
        let blob = Uuid::parse_str(blob)
            .map_err(|e| StorageError::InvalidBlobUrl(format!("invalid blob id: {e}")))?;

        Ok(Self { session, blob })
    }
}

impl fmt::Debug for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobUrl({self})")
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}/{}", self.session, self.blob)
    }
}
