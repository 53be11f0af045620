//! Core domain library for AgencyDesk (config, storage, models, actions).

/// Per-intent action adapters over the datastore and object storage.
pub mod actions;
/// Booking widget rules (slots, promo codes).
pub mod booking;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Database access layer and transactions.
pub mod db;
/// Process-global environment helpers.
pub mod env;
/// Application error types (storage/domain).
pub mod error;
/// Display formatting for sizes, dates and amounts.
pub mod format;
/// Caller identity and session lookup.
pub mod identity;
/// Data models for requests and persistence.
pub mod models;
/// Object storage for uploaded files.
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use actions::{ActionError, ActionResult, Services};
pub use config::Config;
pub use constants::DEFAULT_PORT;
pub use db::Database;
pub use error::AppError;
pub use identity::{Identity, SessionProvider, StaticSession};
pub use storage::{FsObjectStore, ObjectStore, StorageError};
