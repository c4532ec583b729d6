use std::fmt;

/// Errors that can occur in the blob runtime or the key-value store.
#[derive(Debug)]
pub enum StorageError {
    /// The blob reference was revoked, belongs to another session, or never existed.
    NotFound(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The key is not usable as a store key.
    InvalidKey(String),
    /// The string is not a well-formed blob URL.
    InvalidBlobUrl(String),
    /// The blob exceeds the configured size limit.
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// The value exceeds the key-value store quota.
    QuotaExceeded { actual: u64, limit: u64 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(url) => write!(f, "blob not found: {url}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::InvalidKey(msg) => write!(f, "invalid store key: {msg}"),
            Self::InvalidBlobUrl(msg) => write!(f, "invalid blob URL: {msg}"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "blob exceeds size limit ({actual} > {limit} bytes)")
            }
            Self::QuotaExceeded { actual, limit } => {
                write!(f, "value exceeds store quota ({actual} > {limit} bytes)")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
