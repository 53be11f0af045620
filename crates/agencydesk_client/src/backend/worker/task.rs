//! Task command handlers for the backend worker.

use super::{log_outcome, WorkerState};
use crate::backend::CoreEvent;
use crate::optimistic::{MutationId, PendingId};
use agencydesk_core::actions::task;
use agencydesk_core::models::task::{CreateTaskRequest, TaskPatch};

pub(super) fn handle_list_tasks(state: &mut WorkerState) {
    let result = task::list_tasks(&state.services, state.session()).into_result();
    log_outcome("list tasks", &result);
    state.send(CoreEvent::TasksLoaded { result });
}

pub(super) fn handle_create_task(
    state: &mut WorkerState,
    pending: PendingId,
    request: CreateTaskRequest,
) {
    let result = task::create_task(&state.services, state.session(), &request).into_result();
    log_outcome("create task", &result);
    state.send(CoreEvent::TaskCreated { pending, result });
}

pub(super) fn handle_update_task(
    state: &mut WorkerState,
    mutation: MutationId,
    id: String,
    patch: TaskPatch,
) {
    let result = task::update_task(&state.services, state.session(), &id, &patch).into_result();
    log_outcome("update task", &result);
    state.send(CoreEvent::TaskUpdated { mutation, result });
}

pub(super) fn handle_delete_task(state: &mut WorkerState, id: String) {
    let result = task::delete_task(&state.services, state.session(), &id).into_result();
    log_outcome("delete task", &result);
    state.send(CoreEvent::TaskDeleted { id, result });
}
