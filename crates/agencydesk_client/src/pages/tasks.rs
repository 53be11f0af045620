//! Kanban task board.

use super::{drain, send, wait_one, ConfirmGate};
use crate::backend::{spawn_backend, BackendHandle, CoreCmd, CoreEvent};
use crate::feedback::Feedback;
use crate::optimistic::{
    MutationId, MutationTicket, OptimisticCollection, PendingId, RecordKey, Removed, SyncError,
};
use agencydesk_core::models::task::{
    CreateTaskRequest, ReminderInterval, Task, TaskPatch, TaskStatus,
};
use agencydesk_core::{Services, SessionProvider};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct TaskBoard {
    backend: BackendHandle,
    tasks: OptimisticCollection<Task>,
    feedback: Feedback,
    tickets: HashMap<MutationId, MutationTicket<Task>>,
    removals: HashMap<String, Removed<Task>>,
    delete_gate: ConfirmGate<String>,
}

impl TaskBoard {
    pub fn new(services: Services, session: Arc<dyn SessionProvider>) -> Self {
        Self::with_backend(spawn_backend(services, session))
    }

    pub fn with_backend(backend: BackendHandle) -> Self {
        Self {
            backend,
            tasks: OptimisticCollection::new(),
            feedback: Feedback::new(),
            tickets: HashMap::new(),
            removals: HashMap::new(),
            delete_gate: ConfirmGate::default(),
        }
    }

    pub fn refresh(&mut self) {
        send(&self.backend, CoreCmd::ListTasks);
    }

    pub fn create(&mut self, request: CreateTaskRequest) -> PendingId {
        let pending = self.tasks.apply_create(Task::draft(&request));
        send(&self.backend, CoreCmd::CreateTask { pending, request });
        pending
    }

    /// Flip between done and open.
    ///
    /// # Errors
    /// Returns [`SyncError`] when the task is still pending or unknown.
    pub fn toggle_done(&mut self, task_id: &str) -> Result<MutationId, SyncError> {
        let key = RecordKey::Confirmed(task_id.to_string());
        let current = self.tasks.get(&key).ok_or(SyncError::NotFound)?.status;
        self.update(task_id, TaskPatch::status(current.toggled()))
    }

    /// Move a task to another column.
    ///
    /// # Errors
    /// Returns [`SyncError`] when the task is still pending or unknown.
    pub fn move_to(&mut self, task_id: &str, status: TaskStatus) -> Result<MutationId, SyncError> {
        self.update(task_id, TaskPatch::status(status))
    }

    /// Set or clear the reminder cadence.
    ///
    /// # Errors
    /// Returns [`SyncError`] when the task is still pending or unknown.
    pub fn set_reminder(
        &mut self,
        task_id: &str,
        reminder: Option<ReminderInterval>,
    ) -> Result<MutationId, SyncError> {
        self.update(task_id, TaskPatch::reminder(reminder))
    }

    /// Apply an arbitrary patch.
    ///
    /// # Errors
    /// Returns [`SyncError`] when the task is still pending or unknown.
    pub fn update(&mut self, task_id: &str, patch: TaskPatch) -> Result<MutationId, SyncError> {
        let ticket = self
            .tasks
            .apply_mutate(&RecordKey::Confirmed(task_id.to_string()), patch)?;
        let mutation = ticket.mutation;
        send(
            &self.backend,
            CoreCmd::UpdateTask {
                mutation,
                id: task_id.to_string(),
                patch: ticket.patch.clone(),
            },
        );
        self.tickets.insert(mutation, ticket);
        Ok(mutation)
    }

    pub fn request_delete(&mut self, task_id: &str) {
        self.delete_gate.request(task_id.to_string());
    }

    pub fn cancel_delete(&mut self) {
        self.delete_gate.cancel();
    }

    /// Run the staged delete.
    ///
    /// # Errors
    /// Returns [`SyncError::NotFound`] when nothing was staged or the task is
    /// gone, and [`SyncError::StillPending`] for unconfirmed tasks.
    pub fn confirm_delete(&mut self) -> Result<(), SyncError> {
        let id = self.delete_gate.take().ok_or(SyncError::NotFound)?;
        let removed = self.tasks.apply_delete(&RecordKey::Confirmed(id.clone()))?;
        send(&self.backend, CoreCmd::DeleteTask { id: id.clone() });
        self.removals.insert(id, removed);
        Ok(())
    }

    pub fn poll(&mut self) -> usize {
        let mut events = Vec::new();
        drain(&self.backend, |event| events.push(event));
        let handled = events.len();
        for event in events {
            self.handle_event(event);
        }
        handled
    }

    pub fn wait_for_event(&mut self, timeout: Duration) -> bool {
        match wait_one(&self.backend, timeout) {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    pub fn handle_event(&mut self, event: CoreEvent) {
        match event {
            CoreEvent::TasksLoaded { result } => match result {
                Ok(items) => self.tasks.replace_confirmed(items),
                Err(err) => self.feedback.set_status(err.to_string()),
            },
            CoreEvent::TaskCreated { pending, result } => match result {
                Ok(task) => self.tasks.confirm_create(pending, task),
                Err(err) => {
                    let reason = err.to_string();
                    self.tasks.reject_create(pending, &reason);
                    self.feedback.set_status(reason);
                }
            },
            CoreEvent::TaskUpdated { mutation, result } => {
                let Some(ticket) = self.tickets.remove(&mutation) else {
                    return;
                };
                match result {
                    Ok(task) => self.tasks.confirm_mutate_with(&ticket, task),
                    Err(err) => {
                        self.tasks.reject_mutate(&ticket);
                        self.feedback.set_status(err.to_string());
                    }
                }
            }
            CoreEvent::TaskDeleted { id, result } => {
                let Some(removed) = self.removals.remove(&id) else {
                    return;
                };
                match result {
                    Ok(_) => self.tasks.confirm_delete(&id),
                    Err(err) => {
                        self.tasks.reject_delete(&removed);
                        self.feedback.set_status(err.to_string());
                    }
                }
            }
            other => tracing::debug!("task board ignored event: {:?}", other),
        }
    }

    pub fn tasks(&self) -> &OptimisticCollection<Task> {
        &self.tasks
    }

    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(&RecordKey::Confirmed(task_id.to_string()))
    }

    /// Tasks in one column, in collection order.
    pub fn column(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.records().filter(|t| t.status == status).collect()
    }

    /// Every column, left to right.
    pub fn columns(&self) -> Vec<(TaskStatus, Vec<&Task>)> {
        TaskStatus::ALL
            .iter()
            .map(|status| (*status, self.column(*status)))
            .collect()
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }
}
