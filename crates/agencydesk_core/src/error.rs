//! Errors raised by the AgencyDesk datastore and record validation.
use thiserror::Error;

/// Failure from a [`crate::Database`] call or a model-level check.
///
/// Actions map these onto [`crate::actions::ActionError`] before they reach
/// a client.
#[derive(Error, Debug)]
pub enum AppError {
    /// redb failed to open, read, or commit.
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    /// The data directory or a row it holds is unusable, e.g. `DB_PATH` is a
    /// file or a file's folder vanished mid-transaction.
    #[error("Storage error: {0}")]
    StorageMessage(String),

    /// A row failed to encode or decode with bincode.
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// No folder, file, task, quote, or booking with that id for the caller.
    #[error("Not found")]
    NotFound,

    /// Input rejected before touching storage.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// redb splits its failures by phase; every phase lands in [`AppError::Database`].
macro_rules! redb_phase_into_app_error {
    ($($phase:ty),+ $(,)?) => {
        $(
            impl From<$phase> for AppError {
                fn from(value: $phase) -> Self {
                    Self::Database(value.into())
                }
            }
        )+
    };
}

redb_phase_into_app_error!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);
