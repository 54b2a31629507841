// Consistency tests for concurrent writers, readers and deleters
// sharing one filesystem backend

use bytes::Bytes;
use quizvault_storage::{FilesystemBackend, ObjectStore, StorageError};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

async fn backend(temp_dir: &TempDir) -> Arc<FilesystemBackend> {
    Arc::new(
        FilesystemBackend::new(temp_dir.path().to_path_buf())
            .await
            .unwrap(),
    )
}

fn blob(seed: u8, len: usize) -> Bytes {
    Bytes::from(vec![seed; len])
}

fn files_under(dir: &Path) -> Vec<String> {
    let mut found = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path.strip_prefix(dir).unwrap();
                found.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    found.sort();
    found
}

#[tokio::test]
async fn test_concurrent_put_if_not_exists_single_winner() {
    let temp_dir = TempDir::new().unwrap();
    let backend = backend(&temp_dir).await;
    let data = blob(7, 64 * 1024);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let backend = backend.clone();
        let data = data.clone();
        handles.push(tokio::spawn(async move {
            backend.put_if_not_exists("filedir/ab/cd/abcd", data).await
        }));
    }

    let mut written = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() {
            written += 1;
        }
    }

    assert_eq!(written, 1, "exactly one writer should create the object");
    assert_eq!(backend.get("filedir/ab/cd/abcd").await.unwrap(), data);
    // No temp files left behind
    assert_eq!(files_under(temp_dir.path()), vec!["filedir/ab/cd/abcd"]);
}

#[tokio::test]
async fn test_readers_never_observe_partial_writes() {
    let temp_dir = TempDir::new().unwrap();
    let backend = backend(&temp_dir).await;
    let len = 256 * 1024;

    let writer = {
        let backend = backend.clone();
        tokio::spawn(async move {
            for seed in 1..=20u8 {
                assert!(backend.put_if_not_exists("blob", blob(seed, len)).await.unwrap());
                tokio::task::yield_now().await;
                backend.delete("blob").await.unwrap();
            }
        })
    };
    let reader = {
        let backend = backend.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                match backend.get("blob").await {
                    Ok(data) => {
                        assert_eq!(data.len(), len);
                        let first = data[0];
                        assert!(data.iter().all(|b| *b == first), "torn read");
                    }
                    Err(StorageError::NotFound(_)) => {}
                    Err(e) => panic!("unexpected read error: {e:?}"),
                }
                tokio::task::yield_now().await;
            }
        })
    };

    let (writer, reader) = tokio::join!(writer, reader);
    writer.unwrap();
    reader.unwrap();
}

#[tokio::test]
async fn test_writes_survive_concurrent_pruning_of_shared_dirs() {
    let temp_dir = TempDir::new().unwrap();
    let backend = backend(&temp_dir).await;

    for i in 0..100u8 {
        backend
            .put_if_not_exists(&format!("filedir/aa/bb/old-{i}"), blob(i, 8))
            .await
            .unwrap();
    }

    // Deleting the last old object prunes the shared fan-out dirs while
    // new objects are being written into them
    let deleter = {
        let backend = backend.clone();
        tokio::spawn(async move {
            for i in 0..100u8 {
                backend.delete(&format!("filedir/aa/bb/old-{i}")).await.unwrap();
            }
        })
    };
    let writer = {
        let backend = backend.clone();
        tokio::spawn(async move {
            for i in 0..100u8 {
                let written = backend
                    .put_if_not_exists(&format!("filedir/aa/bb/new-{i}"), blob(i, 8))
                    .await
                    .unwrap();
                assert!(written);
            }
        })
    };

    let (deleter, writer) = tokio::join!(deleter, writer);
    deleter.unwrap();
    writer.unwrap();

    for i in 0..100u8 {
        let key = format!("filedir/aa/bb/new-{i}");
        assert_eq!(backend.get(&key).await.unwrap(), blob(i, 8), "{key}");
        assert!(!backend.exists(&format!("filedir/aa/bb/old-{i}")).await.unwrap());
    }
    assert_eq!(files_under(temp_dir.path()).len(), 100);
}

#[tokio::test]
async fn test_stream_of_deleted_object_fails_cleanly() {
    let temp_dir = TempDir::new().unwrap();
    let backend = backend(&temp_dir).await;

    backend.put_if_not_exists("gone", blob(1, 16)).await.unwrap();
    backend.delete("gone").await.unwrap();

    assert!(matches!(
        backend.get_stream("gone").await,
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        backend.delete("gone").await,
        Err(StorageError::NotFound(_))
    ));
}
