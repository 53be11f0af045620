//! Task storage operations backed by redb.

use super::rows::{load_row, scan_rows, store_row};
use super::tables::TASKS;
use crate::error::AppError;
use crate::models::task::{Task, TaskPatch};
use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for the `tasks` table.
pub struct TaskDb {
    db: Arc<redb::Database>,
}

impl TaskDb {
    /// Initialize the `tasks` table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(TASKS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a new task.
    ///
    /// # Errors
    /// Returns an error if the id already exists or the write fails.
    pub fn create(&self, task: &Task) -> Result<(), AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut tasks = write_txn.open_table(TASKS)?;
            if tasks.get(task.id.as_str())?.is_some() {
                return Err(AppError::StorageMessage(format!(
                    "Task id '{}' already exists",
                    task.id
                )));
            }
            store_row(&mut tasks, &task.id, task)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<Task>, AppError> {
        let read_txn = self.db.begin_read()?;
        let tasks = read_txn.open_table(TASKS)?;
        load_row(&tasks, id)
    }

    /// List tasks owned by `owner_id`, newest first.
    ///
    /// # Errors
    /// Returns an error when iteration or deserialization fails.
    pub fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Task>, AppError> {
        let read_txn = self.db.begin_read()?;
        let tasks = read_txn.open_table(TASKS)?;
        let mut rows: Vec<Task> = scan_rows(&tasks, |t: &Task| t.owner_id == owner_id)?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }

    /// Apply a patch to a stored task.
    ///
    /// # Arguments
    /// - `id`: Task id.
    /// - `patch`: Fields to change.
    /// - `now`: Timestamp used for `updated_at`, completion and reminders.
    ///
    /// # Returns
    /// The updated task, or `None` when it does not exist.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn update(
        &self,
        id: &str,
        patch: &TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, AppError> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut tasks = write_txn.open_table(TASKS)?;
            let Some(mut task) = load_row::<Task>(&tasks, id)? else {
                return Ok(None);
            };
            patch.apply_to(&mut task, now);
            store_row(&mut tasks, id, &task)?;
            task
        };
        write_txn.commit()?;
        Ok(Some(updated))
    }

    /// Delete a task by id.
    ///
    /// # Returns
    /// `true` if a row was removed.
    ///
    /// # Errors
    /// Returns an error when the write fails.
    pub fn delete(&self, id: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut tasks = write_txn.open_table(TASKS)?;
            let removed = tasks.remove(id)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }
}
