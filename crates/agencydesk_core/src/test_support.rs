//! Shared test-only helpers for agencydesk_core.

use crate::actions::Services;
use crate::storage::FsObjectStore;
use crate::Database;
use std::sync::Arc;
use tempfile::TempDir;

/// Creates an isolated temporary database and returns it with the temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
///
/// # Panics
/// Panics if temp-dir creation or database initialization fails.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().expect("db path")).expect("db");
    (db, temp_dir)
}

/// Services over a temp database and a temp object store with `quota` bytes.
///
/// # Panics
/// Panics if the database or object store cannot be created.
pub(crate) fn setup_services(quota: Option<u64>) -> (Services, TempDir) {
    let (db, temp_dir) = setup_temp_db();
    let storage = FsObjectStore::new(
        temp_dir.path().join("objects"),
        "https://files.agencydesk.test",
        quota,
    )
    .expect("object store");
    (Services::new(Arc::new(db), Arc::new(storage)), temp_dir)
}

/// Asserts that every folder of `owner_id` stores the canonical file count.
///
/// # Panics
/// Panics when scanning fails or a stored count drifted.
pub(crate) fn assert_folder_counts_match_canonical(db: &Database, owner_id: &str) {
    let canonical = db.files.count_by_folder().expect("count files");
    for folder in db.folders.list_for_owner(owner_id).expect("list folders") {
        let expected = canonical.get(folder.id.as_str()).copied().unwrap_or(0);
        assert_eq!(
            folder.item_count, expected,
            "folder count drift for folder {}",
            folder.id
        );
    }
}
