//! # Concurrent Store Tests
//!
//! Uniqueness of artifact names must hold when many stores for the same
//! instance race, without any in-process locking. These tests spawn the
//! stores on a multi-threaded runtime so directory creation, staging and
//! publishing genuinely interleave.

use std::sync::Arc;

use pgbr_core::{ArtifactKind, ArtifactStore, InstanceName, SegmentName, StoreError};

const WRITERS: usize = 16;

fn open_temp() -> (tempfile::TempDir, Arc<ArtifactStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::open(dir.path()).unwrap();
    (dir, Arc::new(store))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn distinct_names_all_succeed() {
    let (_root, store) = open_temp();
    let instance = InstanceName::parse("fresh-instance").unwrap();

    let mut handles = Vec::new();
    for i in 0..WRITERS {
        let store = Arc::clone(&store);
        let instance = instance.clone();
        handles.push(tokio::spawn(async move {
            let segment = SegmentName::parse(format!("{:024X}", i + 1)).unwrap();
            let payload = format!("segment {i}").into_bytes();
            store
                .store_wal_segment(&instance, &segment, payload.as_slice())
                .await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let names = store.list_wal_segments(&instance).await.unwrap();
    assert_eq!(names.len(), WRITERS);
    assert_eq!(names.first().map(String::as_str), Some("000000000000000000000010"));
    assert_eq!(names.last().map(String::as_str), Some("000000000000000000000001"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_name_has_exactly_one_winner() {
    let (root, store) = open_temp();
    let instance = InstanceName::parse("racy").unwrap();
    let segment = SegmentName::parse("000000010000000000000042").unwrap();

    let mut handles = Vec::new();
    for i in 0..WRITERS {
        let store = Arc::clone(&store);
        let instance = instance.clone();
        let segment = segment.clone();
        handles.push(tokio::spawn(async move {
            let payload = vec![i as u8; 64 * 1024];
            let result = store
                .store_wal_segment(&instance, &segment, payload.as_slice())
                .await;
            (i, result)
        }));
    }

    let mut winners = Vec::new();
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            (i, Ok(_)) => winners.push(i),
            (_, Err(StoreError::Duplicate { kind, .. })) => {
                assert_eq!(kind, ArtifactKind::WalSegment);
                duplicates += 1;
            }
            (_, Err(other)) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners.len(), 1, "winners: {winners:?}");
    assert_eq!(duplicates, WRITERS - 1);

    // The stored bytes are the winner's, whole and unmixed.
    let stored = std::fs::read(
        root.path()
            .join("racy/wal_segment/000000010000000000000042"),
    )
    .unwrap();
    assert_eq!(stored, vec![winners[0] as u8; 64 * 1024]);

    // No staging files survive the race.
    let entries: Vec<_> = std::fs::read_dir(root.path().join("racy/wal_segment"))
        .unwrap()
        .collect();
    assert_eq!(entries.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_writers_share_directory_creation() {
    let (_root, store) = open_temp();
    let instance = InstanceName::parse("new-db").unwrap();

    let mut handles = Vec::new();
    for _ in 0..WRITERS {
        let store = Arc::clone(&store);
        let instance = instance.clone();
        handles.push(tokio::spawn(async move {
            store.storage_dir(&instance, ArtifactKind::BaseBackup).await
        }));
    }

    let mut dirs = Vec::new();
    for handle in handles {
        dirs.push(handle.await.unwrap().unwrap());
    }
    dirs.dedup();
    assert_eq!(dirs.len(), 1);
    assert!(dirs[0].is_dir());
}
