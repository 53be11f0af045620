//! Object storage for uploaded files.
//!
//! Object paths are namespaced `owner/folder/<millis>-<name>` so two uploads of
//! the same file name never collide. [`FsObjectStore`] keeps objects under a
//! root directory and can enforce a byte quota across all owners.

use crate::format::sanitize_file_name;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use walkdir::WalkDir;

/// Object storage failures. Display strings are surfaced verbatim to users.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("quota exceeded")]
    QuotaExceeded,

    #[error("invalid object path: {0}")]
    InvalidPath(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Minimal object storage contract consumed by the file actions.
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path`, replacing nothing: callers build unique paths.
    fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError>;
    /// Remove every listed object. Missing objects are not an error.
    fn remove(&self, paths: &[String]) -> Result<(), StorageError>;
    /// Public URL for an object path.
    fn public_url(&self, path: &str) -> String;
}

/// Build the namespaced object path for an upload.
pub fn object_path(
    owner_id: &str,
    folder_id: &str,
    uploaded_at: DateTime<Utc>,
    file_name: &str,
) -> String {
    format!(
        "{}/{}/{}-{}",
        owner_id,
        folder_id,
        uploaded_at.timestamp_millis().max(0),
        sanitize_file_name(file_name)
    )
}

/// Filesystem-backed object store.
pub struct FsObjectStore {
    root: PathBuf,
    public_base_url: String,
    quota_bytes: Option<u64>,
    // Serializes quota accounting so two uploads cannot both pass the check.
    write_lock: Mutex<()>,
}

impl FsObjectStore {
    /// Open (creating if needed) an object store rooted at `root`.
    ///
    /// # Errors
    /// Returns an error when the root directory cannot be created.
    pub fn new(
        root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
        quota_bytes: Option<u64>,
    ) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            quota_bytes,
            write_lock: Mutex::new(()),
        })
    }

    /// Root directory for stored objects.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Total bytes currently stored.
    ///
    /// # Errors
    /// Returns an error when the directory walk fails.
    pub fn used_bytes(&self) -> Result<u64, StorageError> {
        let mut total = 0u64;
        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() {
                let len = entry.metadata().map_err(std::io::Error::from)?.len();
                total = total.saturating_add(len);
            }
        }
        Ok(total)
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        if path.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStore for FsObjectStore {
    fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::InvalidPath("object store lock poisoned".to_string()))?;

        if let Some(quota) = self.quota_bytes {
            let used = self.used_bytes()?;
            if used.saturating_add(bytes.len() as u64) > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut staging = target.clone().into_os_string();
        staging.push(".partial");
        let staging = PathBuf::from(staging);
        std::fs::write(&staging, bytes)?;
        std::fs::rename(&staging, &target)?;
        tracing::debug!(path, bytes = bytes.len(), "stored object");
        Ok(())
    }

    fn remove(&self, paths: &[String]) -> Result<(), StorageError> {
        for path in paths {
            let target = self.resolve(path)?;
            match std::fs::remove_file(&target) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn store(quota: Option<u64>) -> (FsObjectStore, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let store = FsObjectStore::new(dir.path().join("objects"), "https://cdn.test/o/", quota)
            .expect("store");
        (store, dir)
    }

    #[test]
    fn object_path_is_namespaced_and_timestamped() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let path = object_path("user-1", "folder-9", at, "Q3 report.pdf");
        assert_eq!(
            path,
            format!("user-1/folder-9/{}-Q3_report.pdf", at.timestamp_millis())
        );
    }

    #[test]
    fn upload_then_remove_round_trips_through_disk() {
        let (store, _dir) = store(None);
        store.upload("u/f/1-a.txt", b"hello").expect("upload");
        assert_eq!(store.used_bytes().expect("usage"), 5);
        assert_eq!(store.public_url("u/f/1-a.txt"), "https://cdn.test/o/u/f/1-a.txt");

        store
            .remove(&["u/f/1-a.txt".to_string(), "u/f/missing.txt".to_string()])
            .expect("remove");
        assert_eq!(store.used_bytes().expect("usage"), 0);
    }

    #[test]
    fn upload_rejects_when_quota_would_be_exceeded() {
        let (store, _dir) = store(Some(8));
        store.upload("u/f/1-a.txt", b"12345").expect("fits");
        let err = store.upload("u/f/2-b.txt", b"6789").expect_err("over quota");
        assert!(matches!(err, StorageError::QuotaExceeded));
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[test]
    fn paths_escaping_the_root_are_rejected() {
        let (store, _dir) = store(None);
        for bad in ["../x", "/abs/path", "a/../../b", ""] {
            assert!(
                matches!(store.upload(bad, b"x"), Err(StorageError::InvalidPath(_))),
                "path should be rejected: {bad}"
            );
        }
    }
}
