//! Quote and invoice storage backed by redb.
//!
//! Document numbers are assigned per owner and kind inside the insert
//! transaction, so two concurrent creates never share a number.

use super::rows::{load_row, scan_rows, store_row};
use super::tables::{QUOTES, QUOTE_SEQUENCES};
use crate::error::AppError;
use crate::models::quote::{document_number, Quote, QuoteKind, QuotePatch};
use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for the `quotes` and `quote_sequences` tables.
pub struct QuoteDb {
    db: Arc<redb::Database>,
}

fn sequence_key(owner_id: &str, kind: QuoteKind) -> String {
    format!("{}:{}", owner_id, kind)
}

impl QuoteDb {
    /// Initialize quote tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(QUOTES)?;
        write_txn.open_table(QUOTE_SEQUENCES)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a document, assigning the next number for its owner and kind.
    ///
    /// # Returns
    /// The stored row with `number` filled in.
    ///
    /// # Errors
    /// Returns an error if the id already exists or the write fails.
    pub fn create(&self, quote: &Quote) -> Result<Quote, AppError> {
        let mut quote = quote.clone();
        let write_txn = self.db.begin_write()?;
        {
            let mut quotes = write_txn.open_table(QUOTES)?;
            let mut sequences = write_txn.open_table(QUOTE_SEQUENCES)?;
            if quotes.get(quote.id.as_str())?.is_some() {
                return Err(AppError::StorageMessage(format!(
                    "Quote id '{}' already exists",
                    quote.id
                )));
            }

            let key = sequence_key(&quote.owner_id, quote.kind);
            let next = sequences
                .get(key.as_str())?
                .map(|guard| guard.value())
                .unwrap_or(0)
                .saturating_add(1);
            sequences.insert(key.as_str(), next)?;

            quote.number = document_number(quote.kind, next);
            store_row(&mut quotes, &quote.id, &quote)?;
        }
        write_txn.commit()?;
        Ok(quote)
    }

    pub fn get(&self, id: &str) -> Result<Option<Quote>, AppError> {
        let read_txn = self.db.begin_read()?;
        let quotes = read_txn.open_table(QUOTES)?;
        load_row(&quotes, id)
    }

    /// List quotes and invoices owned by `owner_id`, newest first.
    ///
    /// # Errors
    /// Returns an error when iteration or deserialization fails.
    pub fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Quote>, AppError> {
        let read_txn = self.db.begin_read()?;
        let quotes = read_txn.open_table(QUOTES)?;
        let mut rows: Vec<Quote> = scan_rows(&quotes, |q: &Quote| q.owner_id == owner_id)?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.number.cmp(&a.number)));
        Ok(rows)
    }

    /// Apply a patch to a stored document.
    ///
    /// # Returns
    /// The updated row, or `None` when it does not exist.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn update(
        &self,
        id: &str,
        patch: &QuotePatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Quote>, AppError> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut quotes = write_txn.open_table(QUOTES)?;
            let Some(mut quote) = load_row::<Quote>(&quotes, id)? else {
                return Ok(None);
            };
            patch.apply_to(&mut quote, now);
            store_row(&mut quotes, id, &quote)?;
            quote
        };
        write_txn.commit()?;
        Ok(Some(updated))
    }

    /// Delete a document by id. Issued numbers are never reused.
    ///
    /// # Errors
    /// Returns an error when the write fails.
    pub fn delete(&self, id: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut quotes = write_txn.open_table(QUOTES)?;
            let removed = quotes.remove(id)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }
}
