//! Atomic cross-table transaction helpers for folder-affecting mutations.

use super::rows::{load_row, scan_rows, store_row};
use super::tables::{FILES, FOLDERS};
use super::Database;
use crate::error::AppError;
use crate::models::file::{FileRecord, UpdateFileRequest};
use crate::models::folder::Folder;
use redb::ReadableTable;
use std::collections::HashMap;

/// Atomic operations that update file and folder rows together.
pub struct TransactionOps;

fn adjust_count(
    folders: &mut redb::Table<&str, &[u8]>,
    folder_id: &str,
    delta: isize,
) -> Result<(), AppError> {
    let Some(mut folder) = load_row::<Folder>(&*folders, folder_id)? else {
        return Ok(());
    };
    folder.item_count = folder.item_count.saturating_add_signed(delta);
    store_row(folders, folder_id, &folder)
}

impl TransactionOps {
    /// Insert a file row and increment its folder's item count.
    ///
    /// # Arguments
    /// - `db`: Open database handle.
    /// - `file`: Row to insert; `file.folder_id` must name an existing folder.
    ///
    /// # Returns
    /// `Ok(())` when the write commits.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] when the folder is missing, or an error
    /// when the id already exists or storage operations fail.
    pub fn create_file_with_folder(db: &Database, file: &FileRecord) -> Result<(), AppError> {
        let write_txn = db.db.begin_write()?;
        {
            let mut files = write_txn.open_table(FILES)?;
            let mut folders = write_txn.open_table(FOLDERS)?;

            if folders.get(file.folder_id.as_str())?.is_none() {
                return Err(AppError::NotFound);
            }
            if files.get(file.id.as_str())?.is_some() {
                return Err(AppError::StorageMessage(format!(
                    "File id '{}' already exists",
                    file.id
                )));
            }

            store_row(&mut files, &file.id, file)?;
            adjust_count(&mut folders, &file.folder_id, 1)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Delete a file row and decrement its folder's item count.
    ///
    /// # Returns
    /// The removed row, or `None` when it did not exist.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn delete_file_with_folder(
        db: &Database,
        file_id: &str,
    ) -> Result<Option<FileRecord>, AppError> {
        let write_txn = db.db.begin_write()?;
        let removed = {
            let mut files = write_txn.open_table(FILES)?;
            let mut folders = write_txn.open_table(FOLDERS)?;

            let Some(file) = load_row::<FileRecord>(&files, file_id)? else {
                return Ok(None);
            };
            let _ = files.remove(file_id)?;
            adjust_count(&mut folders, &file.folder_id, -1)?;
            file
        };
        write_txn.commit()?;
        Ok(Some(removed))
    }

    /// Rename and/or move a file, moving one unit of item count between
    /// folders when the folder changes.
    ///
    /// # Arguments
    /// - `db`: Open database handle.
    /// - `file_id`: File to update.
    /// - `update`: New name and/or destination folder.
    ///
    /// # Returns
    /// The updated row, or `None` when the file does not exist.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] when the destination folder is missing,
    /// or an error when storage operations fail.
    pub fn update_file_with_folders(
        db: &Database,
        file_id: &str,
        update: &UpdateFileRequest,
    ) -> Result<Option<FileRecord>, AppError> {
        let write_txn = db.db.begin_write()?;
        let updated = {
            let mut files = write_txn.open_table(FILES)?;
            let mut folders = write_txn.open_table(FOLDERS)?;

            let Some(mut file) = load_row::<FileRecord>(&files, file_id)? else {
                return Ok(None);
            };
            let old_folder_id = file.folder_id.clone();
            file.apply_update(update);
            let folder_changing = file.folder_id != old_folder_id;

            if folder_changing {
                if folders.get(file.folder_id.as_str())?.is_none() {
                    return Err(AppError::NotFound);
                }
                adjust_count(&mut folders, &old_folder_id, -1)?;
                adjust_count(&mut folders, &file.folder_id, 1)?;
            }
            store_row(&mut files, file_id, &file)?;
            file
        };
        write_txn.commit()?;
        Ok(Some(updated))
    }

    /// Delete a folder together with every file row it contains.
    ///
    /// # Returns
    /// The removed file rows (callers release their stored objects), or `None`
    /// when the folder does not exist.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn delete_folder_with_files(
        db: &Database,
        folder_id: &str,
    ) -> Result<Option<Vec<FileRecord>>, AppError> {
        let write_txn = db.db.begin_write()?;
        let removed = {
            let mut files = write_txn.open_table(FILES)?;
            let mut folders = write_txn.open_table(FOLDERS)?;

            if folders.remove(folder_id)?.is_none() {
                return Ok(None);
            }
            let contained: Vec<FileRecord> =
                scan_rows(&files, |f: &FileRecord| f.folder_id == folder_id)?;
            for file in &contained {
                let _ = files.remove(file.id.as_str())?;
            }
            contained
        };
        write_txn.commit()?;
        Ok(Some(removed))
    }

    /// Recompute every folder's item count from the canonical file rows.
    ///
    /// # Returns
    /// Number of folders whose stored count was corrected.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn reconcile_folder_counts(db: &Database) -> Result<usize, AppError> {
        let write_txn = db.db.begin_write()?;
        let repaired = {
            let files = write_txn.open_table(FILES)?;
            let mut folders = write_txn.open_table(FOLDERS)?;

            let mut counts: HashMap<String, usize> = HashMap::new();
            for file in scan_rows::<FileRecord, _>(&files, |_| true)? {
                *counts.entry(file.folder_id).or_insert(0) += 1;
            }

            let mut drifted = Vec::new();
            for folder in scan_rows::<Folder, _>(&folders, |_| true)? {
                let canonical = counts.get(&folder.id).copied().unwrap_or(0);
                if folder.item_count != canonical {
                    drifted.push((folder, canonical));
                }
            }
            let repaired = drifted.len();
            for (mut folder, canonical) in drifted {
                tracing::warn!(
                    "Repairing item count for folder '{}': {} -> {}",
                    folder.id,
                    folder.item_count,
                    canonical
                );
                folder.item_count = canonical;
                store_row(&mut folders, &folder.id, &folder)?;
            }
            repaired
        };
        write_txn.commit()?;
        Ok(repaired)
    }
}
