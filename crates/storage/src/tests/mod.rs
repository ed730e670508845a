//! Test utilities and module declarations for storage tests.

mod queue_tests;
mod topic_tests;

use tempfile::TempDir;

use crate::Store;

/// Returns a `Store` over a fresh on-disk database in a temp dir. The
/// `TempDir` must be kept alive by the caller for the store's lifetime — its
/// `Drop` deletes the directory.
pub fn create_test_store() -> (Store, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let store = Store::open(&db_path, 30).unwrap();
    (store, temp_dir)
}
