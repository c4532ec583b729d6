use std::sync::Arc;

use common::storage::memory::{MemoryBlobRuntime, MemoryKeyValueStore};
use common::storage::{BlobRuntime, KeyValueStore, StorageError};
use registry::{FileRegistry, RawFile, RegistryError};

use crate::support::{KEY, TestSession, text_file};

#[test]
fn metadata_survives_restart_without_blobs() {
    let mut session = TestSession::start();
    session
        .registry
        .add([
            RawFile::from_bytes("f1.png", Some("image/png".into()), vec![1u8; 10]),
            RawFile::from_bytes("f2.pdf", Some("application/pdf".into()), vec![2u8; 20]),
        ])
        .unwrap();
    let before = session.in_memory();
    let old_urls: Vec<_> = session
        .registry
        .files()
        .iter()
        .map(|r| *r.blob_url().unwrap())
        .collect();

    let session = session.restart();

    assert_eq!(session.registry.len(), 2);
    assert_eq!(session.in_memory(), before);
    for (record, old_url) in session.registry.files().iter().zip(&old_urls) {
        assert!(record.blob().is_none());
        assert!(record.blob_url().is_none());
        assert!(!session.blobs.is_live(old_url));
    }
    assert_eq!(session.registry.files()[0].name(), "f1.png");
    assert_eq!(session.registry.files()[1].size_bytes(), 20);
}

#[test]
fn created_at_round_trips() {
    let mut session = TestSession::start();
    session.registry.add([text_file("a")]).unwrap();
    let created_at = session.registry.files()[0].created_at();

    let session = session.restart();
    assert_eq!(session.registry.files()[0].created_at(), created_at);
}

#[test]
fn restored_records_cannot_be_downloaded() {
    let mut session = TestSession::start();
    let ids = session.registry.add([text_file("a")]).unwrap();

    let mut session = session.restart();
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        session.registry.download(&ids[0], dir.path()),
        Err(RegistryError::BlobUnavailable(_))
    ));

    let details = session.registry.details(&ids[0]).unwrap();
    assert!(!details.available);
    assert!(!details.previewable);
}

#[test]
fn restored_records_can_still_be_removed() {
    let mut session = TestSession::start();
    let ids = session.registry.add([text_file("a"), text_file("b")]).unwrap();

    let mut session = session.restart();
    assert!(session.registry.remove(&ids[0]).unwrap());
    assert_eq!(session.stored().unwrap().len(), 1);

    let session = session.restart();
    assert_eq!(session.registry.files()[0].id(), &ids[1]);
}

#[test]
fn new_files_mix_with_restored_ones() {
    let mut session = TestSession::start();
    session.registry.add([text_file("old")]).unwrap();

    let mut session = session.restart();
    session.registry.add([text_file("new")]).unwrap();

    let files = session.registry.files();
    assert_eq!(files[0].name(), "old");
    assert!(files[0].blob_url().is_none());
    assert_eq!(files[1].name(), "new");
    assert!(files[1].blob_url().is_some());
}

#[test]
fn missing_snapshot_starts_empty() {
    let session = TestSession::start();
    assert!(session.registry.is_empty());
}

#[test]
fn corrupt_snapshots_start_empty() {
    for raw in [
        "not json",
        "{\"id\":\"a\"}",
        "[{\"id\":\"a\"}]",
        "[{\"id\":\"a\",\"name\":\"x\",\"type\":\"t\",\"size\":1,\"createdAt\":\"nope\"}]",
        "[{\"id\":\"a\",\"name\":\"x\",\"type\":\"t\",\"size\":1,\"createdAt\":\"2024-05-01T12:00:00Z\"},\
          {\"id\":\"a\",\"name\":\"y\",\"type\":\"t\",\"size\":1,\"createdAt\":\"2024-05-01T12:00:00Z\"}]",
    ] {
        let store = MemoryKeyValueStore::new();
        store.set(KEY, raw).unwrap();

        let session = TestSession::resume(store);
        assert!(session.registry.is_empty(), "{raw:?} should be discarded");
        // The corrupt value is left alone until the next mutation.
        assert_eq!(session.stored_raw().as_deref(), Some(raw));
    }
}

#[test]
fn corrupt_snapshot_is_overwritten_by_next_mutation() {
    let store = MemoryKeyValueStore::new();
    store.set(KEY, "garbage").unwrap();

    let mut session = TestSession::resume(store);
    session.registry.add([text_file("a")]).unwrap();
    assert_eq!(session.stored().unwrap().len(), 1);
}

#[test]
fn snapshot_written_by_browser_is_accepted() {
    let store = MemoryKeyValueStore::new();
    store
        .set(
            KEY,
            r#"[{"id":"k3j2h1g4f5d6s7a8","name":"招标文件.pdf","type":"application/pdf","size":2048,"url":"blob:http://localhost/1234","createdAt":"2024-05-01T12:00:00.000Z"}]"#,
        )
        .unwrap();

    let session = TestSession::resume(store);
    let record = &session.registry.files()[0];
    assert_eq!(record.id().as_str(), "k3j2h1g4f5d6s7a8");
    assert_eq!(record.name(), "招标文件.pdf");
    assert!(record.blob_url().is_none());
}

/// Store whose reads always fail.
struct UnreadableStore;

impl KeyValueStore for UnreadableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk on fire")))
    }
    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Ok(())
    }
    fn remove(&self, _key: &str) -> Result<bool, StorageError> {
        Ok(false)
    }
}

#[test]
fn unreadable_store_starts_empty() {
    let registry = FileRegistry::restore(
        Arc::new(MemoryBlobRuntime::default()),
        Arc::new(UnreadableStore),
        KEY,
    );
    assert!(registry.is_empty());
}
