//! Shared test-only helpers for agencydesk_client.

use agencydesk_core::{Database, FsObjectStore, Identity, Services, SessionProvider, StaticSession};
use std::sync::Arc;
use tempfile::TempDir;

/// Services over a temp database and a temp object store with `quota` bytes.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
///
/// # Panics
/// Panics if the database or object store cannot be created.
pub(crate) fn setup_services(quota: Option<u64>) -> (Services, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().expect("db path")).expect("db");
    let storage = FsObjectStore::new(
        temp_dir.path().join("objects"),
        "https://files.agencydesk.test",
        quota,
    )
    .expect("object store");
    (Services::new(Arc::new(db), Arc::new(storage)), temp_dir)
}

pub(crate) fn session_for(user_id: &str) -> Arc<dyn SessionProvider> {
    Arc::new(StaticSession::signed_in(Identity::new(user_id)))
}
