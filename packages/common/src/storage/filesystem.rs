use std::collections::HashSet;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::StorageError;
use super::traits::{BlobRuntime, KeyValueStore};
use super::url::BlobUrl;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Write `data` to `path` through a temp file in `tmp_dir` and an atomic rename.
fn write_atomic(tmp_dir: &Path, path: &Path, data: &[u8]) -> io::Result<()> {
    let temp_path = tmp_dir.join(Uuid::new_v4().to_string());
    if let Err(e) = fs::write(&temp_path, data) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    Ok(())
}

const SESSION_LOCK: &str = ".lock";

/// Remove session directories whose owner is gone.
///
/// A running session holds an exclusive lock on its `.lock` file, and the OS
/// drops that lock when the process exits however it exits. A directory whose
/// lock can be taken therefore belongs to a session that never ran `Drop`.
fn reclaim_abandoned_sessions(sessions_dir: &Path) {
    let entries = match fs::read_dir(sessions_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return,
        Err(e) => {
            warn!(dir = %sessions_dir.display(), error = %e, "Failed to scan blob sessions");
            return;
        }
    };

    for entry in entries.flatten() {
        let dir = entry.path();
        let Ok(lock_file) = fs::File::open(dir.join(SESSION_LOCK)) else {
            continue;
        };
        if lock_file.try_lock().is_err() {
            continue;
        }

        match fs::remove_dir_all(&dir) {
            Ok(()) => info!(dir = %dir.display(), "Reclaimed abandoned blob session"),
            Err(e) => warn!(
                dir = %dir.display(),
                error = %e,
                "Failed to remove abandoned blob session"
            ),
        }
    }
}

/// Filesystem-backed blob runtime for one session.
///
/// Blobs are spooled to `{sessions_dir}/{session}/{blob}`. Dropping the
/// runtime ends the session and removes its directory, so no reference
/// outlives it. Directories of sessions that ended without `Drop` are
/// removed by the next runtime started on the same `sessions_dir`.
pub struct FilesystemBlobRuntime {
    session: Uuid,
    session_dir: PathBuf,
    max_size: u64,
    live: Mutex<HashSet<BlobUrl>>,
    /// Locked for as long as the session runs.
    lock_file: Option<fs::File>,
}

impl FilesystemBlobRuntime {
    /// Start a new session under `sessions_dir`.
    pub fn new(sessions_dir: &Path, max_size: u64) -> Result<Self, StorageError> {
        reclaim_abandoned_sessions(sessions_dir);

        let session = Uuid::new_v4();
        let session_dir = sessions_dir.join(session.to_string());
        fs::create_dir_all(session_dir.join(".tmp"))?;
        let lock_file = fs::File::create(session_dir.join(SESSION_LOCK))?;
        lock_file.try_lock().map_err(|e| match e {
            fs::TryLockError::Error(e) => StorageError::Io(e),
            fs::TryLockError::WouldBlock => {
                StorageError::Io(io::Error::other("blob session lock is already held"))
            }
        })?;

        debug!(session = %session, dir = %session_dir.display(), "Blob session started");
        Ok(Self {
            session,
            session_dir,
            max_size,
            live: Mutex::new(HashSet::new()),
            lock_file: Some(lock_file),
        })
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    fn blob_path(&self, url: &BlobUrl) -> PathBuf {
        self.session_dir.join(url.blob_id().to_string())
    }

    fn temp_path(&self) -> PathBuf {
        self.session_dir
            .join(".tmp")
            .join(Uuid::new_v4().to_string())
    }

    fn spool(&self, reader: &mut dyn Read, temp_path: &Path) -> Result<(), StorageError> {
        let mut temp_file = fs::File::create(temp_path)?;
        let mut buf = vec![0u8; 64 * 1024];
        let mut total_bytes: u64 = 0;

        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > self.max_size {
                return Err(StorageError::SizeLimitExceeded {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            temp_file.write_all(&buf[..n])?;
        }

        temp_file.flush()?;
        Ok(())
    }
}

impl BlobRuntime for FilesystemBlobRuntime {
    fn create_from_reader(&self, reader: &mut dyn Read) -> Result<BlobUrl, StorageError> {
        let temp_path = self.temp_path();
        if let Err(e) = self.spool(reader, &temp_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        let url = BlobUrl::mint(self.session);
        if let Err(e) = fs::rename(&temp_path, self.blob_path(&url)) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        lock(&self.live).insert(url);
        Ok(url)
    }

    fn read(&self, url: &BlobUrl) -> Result<Vec<u8>, StorageError> {
        if !self.is_live(url) {
            return Err(StorageError::NotFound(url.to_string()));
        }
        match fs::read(self.blob_path(url)) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(url.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn is_live(&self, url: &BlobUrl) -> bool {
        lock(&self.live).contains(url)
    }

    fn revoke(&self, url: &BlobUrl) -> bool {
        if !lock(&self.live).remove(url) {
            return false;
        }
        if let Err(e) = fs::remove_file(self.blob_path(url)) {
            warn!(url = %url, error = %e, "Failed to delete spooled blob");
        }
        true
    }

    fn live_count(&self) -> usize {
        lock(&self.live).len()
    }
}

impl Drop for FilesystemBlobRuntime {
    fn drop(&mut self) {
        drop(self.lock_file.take());
        match fs::remove_dir_all(&self.session_dir) {
            Ok(()) => debug!(session = %self.session, "Blob session ended"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                session = %self.session,
                error = %e,
                "Failed to remove blob session directory"
            ),
        }
    }
}

/// Filesystem-backed key-value store: one `{key}.json` file per key.
pub struct FilesystemKeyValueStore {
    base_path: PathBuf,
    max_value_size: u64,
}

impl FilesystemKeyValueStore {
    /// Open (creating if needed) a store rooted at `base_path`.
    pub fn new(base_path: PathBuf, max_value_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(base_path.join(".tmp"))?;
        Ok(Self {
            base_path,
            max_value_size,
        })
    }

    fn value_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{key}.json")))
    }
}

/// Keys become file names, so they must be flat and unsurprising.
fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key cannot be empty".into()));
    }
    if key.len() > 128 {
        return Err(StorageError::InvalidKey(
            "key exceeds maximum length of 128 characters".into(),
        ));
    }
    if key.starts_with('.') {
        return Err(StorageError::InvalidKey("key must not start with '.'".into()));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(StorageError::InvalidKey(format!(
            "'{key}' contains invalid characters (allowed: a-zA-Z0-9, -, _, .)"
        )));
    }
    Ok(())
}

impl KeyValueStore for FilesystemKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.value_path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.value_path(key)?;
        if value.len() as u64 > self.max_value_size {
            return Err(StorageError::QuotaExceeded {
                actual: value.len() as u64,
                limit: self.max_value_size,
            });
        }
        write_atomic(&self.base_path.join(".tmp"), &path, value.as_bytes())?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        match fs::remove_file(self.value_path(key)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
