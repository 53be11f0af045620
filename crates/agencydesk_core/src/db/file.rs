//! File metadata reads backed by redb.
//!
//! Writes go through [`crate::db::TransactionOps`] so the owning folder's
//! item count changes in the same transaction.

use super::rows::{load_row, scan_rows};
use super::tables::FILES;
use crate::{error::AppError, models::file::FileRecord};
use redb::ReadableDatabase;
use std::collections::HashMap;
use std::sync::Arc;

/// Accessor for the `files` table.
pub struct FileDb {
    db: Arc<redb::Database>,
}

impl FileDb {
    /// Initialize the `files` table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(FILES)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Fetch a file row by id.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, id: &str) -> Result<Option<FileRecord>, AppError> {
        let read_txn = self.db.begin_read()?;
        let files = read_txn.open_table(FILES)?;
        load_row(&files, id)
    }

    /// List files in one folder, newest first.
    ///
    /// # Arguments
    /// - `owner_id`: Owner the rows must belong to.
    /// - `folder_id`: Containing folder.
    ///
    /// # Errors
    /// Returns an error when iteration or deserialization fails.
    pub fn list_for_folder(
        &self,
        owner_id: &str,
        folder_id: &str,
    ) -> Result<Vec<FileRecord>, AppError> {
        let read_txn = self.db.begin_read()?;
        let files = read_txn.open_table(FILES)?;
        let mut rows: Vec<FileRecord> = scan_rows(&files, |f: &FileRecord| {
            f.owner_id == owner_id && f.folder_id == folder_id
        })?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }

    /// Count file rows per folder id across all owners.
    ///
    /// # Errors
    /// Returns an error when iteration or deserialization fails.
    pub fn count_by_folder(&self) -> Result<HashMap<String, usize>, AppError> {
        let read_txn = self.db.begin_read()?;
        let files = read_txn.open_table(FILES)?;
        let rows: Vec<FileRecord> = scan_rows(&files, |_| true)?;
        let mut counts = HashMap::new();
        for row in rows {
            *counts.entry(row.folder_id).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
