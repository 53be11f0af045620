//! Booking storage backed by redb.

use super::rows::{scan_rows, store_row};
use super::tables::BOOKINGS;
use crate::error::AppError;
use crate::models::booking::Booking;
use chrono::NaiveDate;
use redb::ReadableDatabase;
use std::sync::Arc;

/// Accessor for the `bookings` table.
pub struct BookingDb {
    db: Arc<redb::Database>,
}

impl BookingDb {
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(BOOKINGS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a booking.
    ///
    /// # Errors
    /// Returns an error when serialization or the write fails.
    pub fn create(&self, booking: &Booking) -> Result<(), AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut bookings = write_txn.open_table(BOOKINGS)?;
            store_row(&mut bookings, &booking.id, booking)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Bookings on `date`, earliest first.
    ///
    /// # Errors
    /// Returns an error when iteration or deserialization fails.
    pub fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        let read_txn = self.db.begin_read()?;
        let bookings = read_txn.open_table(BOOKINGS)?;
        let mut rows: Vec<Booking> = scan_rows(&bookings, |b: &Booking| b.date == date)?;
        rows.sort_by_key(|b| b.time);
        Ok(rows)
    }
}
