//! Row encoding helpers shared by the table accessors.

use crate::error::AppError;
use redb::ReadableTable;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn load_row<T: DeserializeOwned>(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    id: &str,
) -> Result<Option<T>, AppError> {
    match table.get(id)? {
        Some(value) => Ok(Some(bincode::deserialize(value.value())?)),
        None => Ok(None),
    }
}

pub(crate) fn store_row<T: Serialize>(
    table: &mut redb::Table<&str, &[u8]>,
    id: &str,
    row: &T,
) -> Result<(), AppError> {
    let encoded = bincode::serialize(row)?;
    table.insert(id, encoded.as_slice())?;
    Ok(())
}

/// Decode every row that passes `keep`.
pub(crate) fn scan_rows<T, F>(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    mut keep: F,
) -> Result<Vec<T>, AppError>
where
    T: DeserializeOwned,
    F: FnMut(&T) -> bool,
{
    let mut rows = Vec::new();
    for item in table.iter()? {
        let (_, value) = item?;
        let row: T = bincode::deserialize(value.value())?;
        if keep(&row) {
            rows.push(row);
        }
    }
    Ok(rows)
}
