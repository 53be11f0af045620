//! Task board intents.

use super::{finish, owned, require_identity, validate_name, ActionError, ActionResult, Services};
use crate::identity::SessionProvider;
use crate::models::task::{CreateTaskRequest, Task, TaskPatch};
use crate::models::Deleted;
use chrono::Utc;

pub fn list_tasks(services: &Services, session: &dyn SessionProvider) -> ActionResult<Vec<Task>> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        Ok(services.db.tasks.list_for_owner(&identity.user_id)?)
    })();
    finish("list_tasks", result)
}

pub fn create_task(
    services: &Services,
    session: &dyn SessionProvider,
    request: &CreateTaskRequest,
) -> ActionResult<Task> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        validate_name("task title", &request.title)?;
        let task = Task::from_request(&identity.user_id, request, Utc::now());
        services.db.tasks.create(&task)?;
        Ok(task)
    })();
    finish("create_task", result)
}

/// Apply a partial update: status moves, done toggles, reminder changes, edits.
pub fn update_task(
    services: &Services,
    session: &dyn SessionProvider,
    task_id: &str,
    patch: &TaskPatch,
) -> ActionResult<Task> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        if let Some(title) = &patch.title {
            validate_name("task title", title)?;
        }
        if patch.clear_due_date && patch.due_date.is_some() {
            return Err(ActionError::ValidationFailed(
                "due_date and clear_due_date are mutually exclusive".to_string(),
            ));
        }
        if patch.clear_reminder && patch.reminder.is_some() {
            return Err(ActionError::ValidationFailed(
                "reminder and clear_reminder are mutually exclusive".to_string(),
            ));
        }
        owned(services.db.tasks.get(task_id)?, &identity, |t| {
            t.owner_id.as_str()
        })?;
        services
            .db
            .tasks
            .update(task_id, patch, Utc::now())?
            .ok_or(ActionError::NotFound)
    })();
    finish("update_task", result)
}

pub fn delete_task(
    services: &Services,
    session: &dyn SessionProvider,
    task_id: &str,
) -> ActionResult<Deleted> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        owned(services.db.tasks.get(task_id)?, &identity, |t| {
            t.owner_id.as_str()
        })?;
        if !services.db.tasks.delete(task_id)? {
            return Err(ActionError::NotFound);
        }
        Ok(Deleted {
            id: task_id.to_string(),
        })
    })();
    finish("delete_task", result)
}
