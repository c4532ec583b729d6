use std::path::PathBuf;

use serde::Deserialize;

/// Storage configuration shared by every front end.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory for persisted metadata and session spool files.
    /// Default: `{local data dir}/filedrop`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Key under which the registry snapshot is persisted. Default: "fileStorage".
    #[serde(default = "default_snapshot_key")]
    pub snapshot_key: String,
    /// Largest blob accepted by the blob runtime, in bytes. Default: 512 MiB.
    #[serde(default = "default_max_blob_size")]
    pub max_blob_size: u64,
    /// Largest value accepted by the key-value store, in bytes. Default: 5 MiB.
    #[serde(default = "default_max_value_size")]
    pub max_value_size: u64,
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("filedrop"))
        .unwrap_or_else(|| PathBuf::from(".filedrop"))
}
fn default_snapshot_key() -> String {
    "fileStorage".into()
}
fn default_max_blob_size() -> u64 {
    512 * 1024 * 1024
}
fn default_max_value_size() -> u64 {
    5 * 1024 * 1024
}

impl StorageConfig {
    /// Directory holding the key-value store files.
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    /// Directory under which each session spools its blobs.
    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            snapshot_key: default_snapshot_key(),
            max_blob_size: default_max_blob_size(),
            max_value_size: default_max_value_size(),
        }
    }
}
