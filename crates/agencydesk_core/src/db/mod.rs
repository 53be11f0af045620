//! Database layer and transactional helpers for AgencyDesk.

/// Booking storage helpers.
pub mod booking;
/// File metadata reads.
pub mod file;
/// Folder storage helpers.
pub mod folder;
/// Quote and invoice storage helpers.
pub mod quote;
mod rows;
/// redb table definitions.
pub mod tables;
/// Task storage helpers.
pub mod task;
/// Cross-table file/folder transactions.
pub mod transactions;

pub use transactions::TransactionOps;

use crate::error::AppError;
use std::path::Path;
use std::sync::Arc;
use tables::REDB_FILE_NAME;

/// Database handle with per-entity table accessors.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub folders: folder::FolderDb,
    pub files: file::FileDb,
    pub tasks: task::TaskDb,
    pub quotes: quote::QuoteDb,
    pub bookings: booking::BookingDb,
}

#[cfg(test)]
mod tests;

impl Database {
    /// Build a database handle from an already-open redb instance.
    ///
    /// # Returns
    /// A new [`Database`] wrapper that shares the underlying redb instance.
    ///
    /// # Errors
    /// Returns an error if the required tables cannot be initialized.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        Ok(Self {
            folders: folder::FolderDb::new(db.clone())?,
            files: file::FileDb::new(db.clone())?,
            tasks: task::TaskDb::new(db.clone())?,
            quotes: quote::QuoteDb::new(db.clone())?,
            bookings: booking::BookingDb::new(db.clone())?,
            db,
        })
    }

    /// Clone this handle for another subsystem in the same process.
    ///
    /// redb allows one open handle per file, so a second subsystem must share
    /// this one rather than reopening the path.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn share(&self) -> Result<Self, AppError> {
        Self::from_shared(self.db.clone())
    }

    /// Open (or create) the database directory and repair derived counts.
    ///
    /// # Arguments
    /// - `path`: Directory that holds [`REDB_FILE_NAME`].
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns [`AppError::StorageMessage`] when `path` exists but is not a
    /// directory, or a database error when redb cannot open the file.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        if dir.exists() && !dir.is_dir() {
            return Err(AppError::StorageMessage(format!(
                "DB_PATH '{}' exists but is not a directory",
                path
            )));
        }
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to create database directory '{}': {}",
                path, err
            ))
        })?;

        let file = dir.join(REDB_FILE_NAME);
        let db = Arc::new(redb::Database::create(&file)?);
        let database = Self::from_shared(db)?;

        let repaired = TransactionOps::reconcile_folder_counts(&database)?;
        if repaired > 0 {
            tracing::info!("Repaired item counts for {} folder(s) on open", repaired);
        }
        Ok(database)
    }
}
