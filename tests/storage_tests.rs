//! Tests for StorageHandle
//!
//! These tests verify:
//! - Bootstrap of the default table on open
//! - Commit/abort behavior of the transaction wrapper
//! - Read-only transactions on a read-only environment

use geocache::storage::StorageHandle;
use geocache::{CacheError, Result};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const TEST_MAP_SIZE: usize = 16 * 1024 * 1024;

fn setup_temp_storage() -> (TempDir, StorageHandle) {
    let temp_dir = TempDir::new().unwrap();
    let storage = StorageHandle::open(temp_dir.path(), false, TEST_MAP_SIZE).unwrap();
    (temp_dir, storage)
}

fn read_value(storage: &StorageHandle, key: &str) -> Result<Option<Vec<u8>>> {
    storage.read(|rtxn, table| {
        let value = table.get(rtxn, key).map_err(CacheError::Storage)?;
        Ok(value.map(|v| v.to_vec()))
    })
}

// =============================================================================
// Open/Close Tests
// =============================================================================

#[test]
fn test_open_creates_environment_files() {
    let (temp, storage) = setup_temp_storage();

    assert!(temp.path().join("data.mdb").exists());
    assert!(!storage.is_read_only());
    storage.close();
}

#[test]
fn test_open_rejects_file_path() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("file");
    std::fs::write(&file, b"x").unwrap();

    let result = StorageHandle::open(&file, false, TEST_MAP_SIZE);

    assert!(matches!(result, Err(CacheError::NotADirectory(_))));
}

#[test]
fn test_close_then_reopen_same_directory() {
    let (temp, storage) = setup_temp_storage();
    storage
        .write(|wtxn, table| table.put(wtxn, "k", b"v\0").map_err(CacheError::Storage))
        .unwrap();
    storage.close();

    let storage = StorageHandle::open(temp.path(), true, TEST_MAP_SIZE).unwrap();
    assert!(storage.is_read_only());
    assert_eq!(read_value(&storage, "k").unwrap(), Some(b"v\0".to_vec()));
    storage.close();
}

// =============================================================================
// Transaction Wrapper Tests
// =============================================================================

#[test]
fn test_write_commits_on_success() {
    let (_temp, storage) = setup_temp_storage();

    let returned = storage
        .write(|wtxn, table| {
            table.put(wtxn, "u33dc0", b"abc\0").map_err(CacheError::Storage)?;
            Ok(42)
        })
        .unwrap();

    assert_eq!(returned, 42);
    assert_eq!(read_value(&storage, "u33dc0").unwrap(), Some(b"abc\0".to_vec()));
}

#[test]
fn test_write_aborts_on_error() {
    let (_temp, storage) = setup_temp_storage();

    let result: Result<()> = storage.write(|wtxn, table| {
        table.put(wtxn, "u33dc0", b"abc\0").map_err(CacheError::Storage)?;
        Err(CacheError::InvalidPayload("rejected after write".to_string()))
    });

    assert!(matches!(result, Err(CacheError::InvalidPayload(_))));
    assert_eq!(read_value(&storage, "u33dc0").unwrap(), None);

    // No write transaction was leaked: the next one can begin
    storage
        .write(|wtxn, table| table.put(wtxn, "u33dc1", b"ok\0").map_err(CacheError::Storage))
        .unwrap();
    assert_eq!(read_value(&storage, "u33dc1").unwrap(), Some(b"ok\0".to_vec()));
}

#[test]
fn test_read_error_takes_precedence() {
    let (_temp, storage) = setup_temp_storage();

    let result: Result<()> = storage.read(|_rtxn, _table| Err(CacheError::Decode("bad".to_string())));

    assert!(matches!(result, Err(CacheError::Decode(_))));

    // Snapshot was released; reads and writes keep working
    assert_eq!(read_value(&storage, "u33dc0").unwrap(), None);
}

#[test]
fn test_read_sees_snapshot_at_begin() {
    let (_temp, storage) = setup_temp_storage();
    storage
        .write(|wtxn, table| table.put(wtxn, "k", b"old\0").map_err(CacheError::Storage))
        .unwrap();

    let seen = storage
        .read(|rtxn, table| {
            let before = table.get(rtxn, "k").map_err(CacheError::Storage)?.map(|v| v.to_vec());

            // A writer on another thread commits while this snapshot is open
            std::thread::scope(|s| {
                s.spawn(|| {
                    storage
                        .write(|wtxn, table| {
                            table.put(wtxn, "k", b"new\0").map_err(CacheError::Storage)
                        })
                        .unwrap();
                })
                .join()
                .unwrap();
            });

            let after = table.get(rtxn, "k").map_err(CacheError::Storage)?.map(|v| v.to_vec());
            Ok((before, after))
        })
        .unwrap();

    assert_eq!(seen.0, Some(b"old\0".to_vec()));
    assert_eq!(seen.1, Some(b"old\0".to_vec()));
    assert_eq!(read_value(&storage, "k").unwrap(), Some(b"new\0".to_vec()));
}

#[test]
fn test_read_only_environment_rejects_write_transaction() {
    let (temp, storage) = setup_temp_storage();
    storage.close();

    let storage = StorageHandle::open(temp.path(), true, TEST_MAP_SIZE).unwrap();
    let result = storage.write(|wtxn, table| {
        table.put(wtxn, "k", b"v\0").map_err(CacheError::Storage)
    });

    assert!(matches!(result, Err(CacheError::Transaction(_))));
    assert_eq!(read_value(&storage, "k").unwrap(), None);
    storage.close();
}

#[test]
fn test_open_same_directory_twice_rejected() {
    let (temp, storage) = setup_temp_storage();

    let result = StorageHandle::open(temp.path(), false, TEST_MAP_SIZE);
    assert!(matches!(result, Err(CacheError::AlreadyOpen(_))));

    storage.close();
    let storage = StorageHandle::open(temp.path(), false, TEST_MAP_SIZE).unwrap();
    storage.close();
}
