//! Folder storage operations backed by redb.

use super::rows::{load_row, scan_rows, store_row};
use super::tables::FOLDERS;
use crate::{error::AppError, models::folder::Folder};
use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for the `folders` table.
pub struct FolderDb {
    db: Arc<redb::Database>,
}

impl FolderDb {
    /// Initialize the `folders` table if it does not exist yet.
    ///
    /// # Returns
    /// A [`FolderDb`] bound to `db`.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(FOLDERS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a new folder.
    ///
    /// # Errors
    /// Returns an error if the id already exists or the write fails.
    pub fn create(&self, folder: &Folder) -> Result<(), AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut folders = write_txn.open_table(FOLDERS)?;
            if folders.get(folder.id.as_str())?.is_some() {
                return Err(AppError::StorageMessage(format!(
                    "Folder id '{}' already exists",
                    folder.id
                )));
            }
            store_row(&mut folders, &folder.id, folder)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch a folder by id.
    ///
    /// # Returns
    /// `Ok(Some(folder))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, id: &str) -> Result<Option<Folder>, AppError> {
        let read_txn = self.db.begin_read()?;
        let folders = read_txn.open_table(FOLDERS)?;
        load_row(&folders, id)
    }

    /// List folders owned by `owner_id`, sorted by name.
    ///
    /// # Errors
    /// Returns an error when iteration or deserialization fails.
    pub fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Folder>, AppError> {
        let read_txn = self.db.begin_read()?;
        let folders = read_txn.open_table(FOLDERS)?;
        let mut rows: Vec<Folder> = scan_rows(&folders, |f: &Folder| f.owner_id == owner_id)?;
        rows.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(rows)
    }

    /// Rename a folder.
    ///
    /// # Returns
    /// The updated folder, or `None` when it does not exist.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn rename(&self, id: &str, name: &str) -> Result<Option<Folder>, AppError> {
        let write_txn = self.db.begin_write()?;
        let renamed = {
            let mut folders = write_txn.open_table(FOLDERS)?;
            let Some(mut folder) = load_row::<Folder>(&folders, id)? else {
                return Ok(None);
            };
            folder.name = name.to_string();
            folder.updated_at = Utc::now();
            store_row(&mut folders, id, &folder)?;
            folder
        };
        write_txn.commit()?;
        Ok(Some(renamed))
    }

    /// Overwrite the stored item count.
    ///
    /// Normal file mutations maintain the count through
    /// [`crate::db::TransactionOps`]; this is the repair path.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] when the folder does not exist.
    pub fn set_count(&self, id: &str, count: usize) -> Result<(), AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut folders = write_txn.open_table(FOLDERS)?;
            let mut folder = load_row::<Folder>(&folders, id)?.ok_or(AppError::NotFound)?;
            folder.item_count = count;
            store_row(&mut folders, id, &folder)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
