//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Canonical folder rows (`Folder`, bincode-encoded).
pub const FOLDERS: TableDefinition<&str, &[u8]> = TableDefinition::new("folders");
/// File metadata rows (`FileRecord`, bincode-encoded).
pub const FILES: TableDefinition<&str, &[u8]> = TableDefinition::new("files");
/// Task rows (`Task`, bincode-encoded).
pub const TASKS: TableDefinition<&str, &[u8]> = TableDefinition::new("tasks");
/// Quote and invoice rows (`Quote`, bincode-encoded).
pub const QUOTES: TableDefinition<&str, &[u8]> = TableDefinition::new("quotes");
/// Public booking rows (`Booking`, bincode-encoded).
pub const BOOKINGS: TableDefinition<&str, &[u8]> = TableDefinition::new("bookings");

/// Last issued document number per `owner:kind`.
pub const QUOTE_SEQUENCES: TableDefinition<&str, u32> = TableDefinition::new("quote_sequences");
