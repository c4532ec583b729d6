use common::storage::BlobRuntime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use registry::{FileId, RawFile};

use crate::support::{TestSession, text_file};

/// Snapshot and memory agree on ids, order, names, types and sizes.
fn assert_consistent(session: &TestSession) {
    let stored = session.stored().unwrap_or_default();
    assert_eq!(stored, session.in_memory());
    assert_eq!(session.blobs.live_count(), session.registry.len());
}

#[test]
fn snapshot_tracks_every_operation() {
    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = TestSession::start();
        let mut known: Vec<FileId> = Vec::new();

        for step in 0..60 {
            match rng.random_range(0..10) {
                0..=4 => {
                    let count = rng.random_range(1..=3);
                    let files: Vec<RawFile> = (0..count)
                        .map(|n| {
                            RawFile::from_bytes(
                                format!("file-{seed}-{step}-{n}.bin"),
                                None,
                                vec![0u8; rng.random_range(0..64)],
                            )
                        })
                        .collect();
                    known.extend(session.registry.add(files).unwrap());
                }
                5..=8 if !known.is_empty() => {
                    // Includes ids that were already removed.
                    let id = known[rng.random_range(0..known.len())].clone();
                    session.registry.remove(&id).unwrap();
                }
                _ => {
                    session.registry.remove_all().unwrap();
                }
            }
            assert_consistent(&session);
        }
    }
}

#[test]
fn every_mutation_rewrites_full_snapshot() {
    let mut session = TestSession::start();
    session.registry.add([text_file("a")]).unwrap();
    let first = session.stored_raw().unwrap();

    let ids = session.registry.add([text_file("b")]).unwrap();
    let second = session.stored_raw().unwrap();
    assert_ne!(first, second);
    assert_eq!(session.stored().unwrap().len(), 2);

    session.registry.remove(&ids[0]).unwrap();
    assert_eq!(session.stored_raw().unwrap(), first);
}

#[test]
fn snapshot_never_contains_blob_references() {
    let mut session = TestSession::start();
    session.registry.add([text_file("a"), text_file("b")]).unwrap();

    let raw = session.stored_raw().unwrap();
    assert!(!raw.contains("blob:"));
    for record in session.registry.files() {
        assert!(!raw.contains(&record.blob_url().unwrap().to_string()));
    }
}

#[test]
fn ids_stay_unique_across_many_additions() {
    let mut session = TestSession::start();
    let mut all = std::collections::HashSet::new();
    for _ in 0..100 {
        let batch: Vec<RawFile> = (0..100)
            .map(|_| RawFile::from_bytes("x", None, Vec::new()))
            .collect();
        for id in session.registry.add(batch).unwrap() {
            assert!(all.insert(id));
        }
    }
    assert_eq!(all.len(), 10_000);
    assert_eq!(session.registry.len(), 10_000);
}
