//! Task board HTTP handlers.

use super::{respond, ApiResult};
use crate::{session::HeaderSession, AppState};
use agencydesk_core::actions::task;
use agencydesk_core::models::task::{CreateTaskRequest, Task, TaskPatch};
use agencydesk_core::models::Deleted;
use axum::{
    extract::{Path, State},
    Json,
};

pub async fn list_tasks(
    State(state): State<AppState>,
    session: HeaderSession,
) -> ApiResult<Vec<Task>> {
    respond(task::list_tasks(&state.services, &session))
}

pub async fn create_task(
    State(state): State<AppState>,
    session: HeaderSession,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Task> {
    respond(task::create_task(&state.services, &session, &req))
}

/// Apply a partial update (status, reminder, fields).
///
/// # Errors
/// Returns 422 for conflicting clear/set pairs or an empty title.
pub async fn update_task(
    State(state): State<AppState>,
    session: HeaderSession,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> ApiResult<Task> {
    respond(task::update_task(&state.services, &session, &id, &patch))
}

pub async fn delete_task(
    State(state): State<AppState>,
    session: HeaderSession,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    respond(task::delete_task(&state.services, &session, &id))
}
