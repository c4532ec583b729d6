use registry::{FileId, RawFile, RegistryError, RegistryEvent};

use crate::support::TestSession;

#[test]
fn writes_content_under_record_name() {
    let mut session = TestSession::start();
    let ids = session
        .registry
        .add([RawFile::from_bytes(
            "report.pdf",
            Some("application/pdf".into()),
            b"%PDF-1.7".to_vec(),
        )])
        .unwrap();
    let dir = tempfile::tempdir().unwrap();

    let path = session.registry.download(&ids[0], dir.path()).unwrap();

    assert_eq!(path, dir.path().join("report.pdf"));
    assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
}

#[test]
fn never_overwrites_existing_files() {
    let mut session = TestSession::start();
    let ids = session
        .registry
        .add([RawFile::from_bytes("notes.txt", None, b"new".to_vec())])
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"old").unwrap();

    let path = session.registry.download(&ids[0], dir.path()).unwrap();

    assert_eq!(path, dir.path().join("notes (1).txt"));
    assert_eq!(std::fs::read(dir.path().join("notes.txt")).unwrap(), b"old");
    assert_eq!(std::fs::read(&path).unwrap(), b"new");
}

#[test]
fn unsafe_names_fall_back() {
    let mut session = TestSession::start();
    let ids = session
        .registry
        .add([RawFile::from_bytes("../escape.sh", None, b"#!".to_vec())])
        .unwrap();
    let dir = tempfile::tempdir().unwrap();

    let path = session.registry.download(&ids[0], dir.path()).unwrap();

    assert_eq!(path, dir.path().join("download"));
}

#[test]
fn creates_destination_directory() {
    let mut session = TestSession::start();
    let ids = session
        .registry
        .add([RawFile::from_bytes("a.txt", None, b"a".to_vec())])
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("nested/downloads");

    let path = session.registry.download(&ids[0], &dest).unwrap();
    assert!(path.starts_with(&dest));
}

#[test]
fn emits_download_started() {
    let mut session = TestSession::start();
    let ids = session
        .registry
        .add([RawFile::from_bytes("a.txt", None, b"a".to_vec())])
        .unwrap();
    let events = session.registry.subscribe();
    let dir = tempfile::tempdir().unwrap();

    session.registry.download(&ids[0], dir.path()).unwrap();

    assert_eq!(
        events.try_recv().unwrap(),
        RegistryEvent::DownloadStarted {
            id: ids[0].clone(),
            name: "a.txt".into()
        }
    );
}

#[test]
fn unknown_id_is_not_found() {
    let mut session = TestSession::start();
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        session.registry.download(&FileId::from("missing"), dir.path()),
        Err(RegistryError::NotFound(_))
    ));
}
