//! Document manager: folders, the files of the open folder, and item counts.

use super::{drain, send, wait_one, ConfirmGate};
use crate::aggregate::AggregateCounter;
use crate::backend::{spawn_backend, BackendHandle, CoreCmd, CoreEvent};
use crate::feedback::Feedback;
use crate::optimistic::{
    MutationId, MutationTicket, OptimisticCollection, PendingId, RecordKey, Removed, SyncError,
};
use agencydesk_core::models::file::{FileRecord, UpdateFileRequest};
use agencydesk_core::models::folder::{Folder, RenameFolderRequest};
use agencydesk_core::{Services, SessionProvider};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Staged destructive intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Folder(String),
    File(String),
}

pub struct DocumentsPage {
    backend: BackendHandle,
    folders: OptimisticCollection<Folder>,
    files: OptimisticCollection<FileRecord>,
    open_folder: Option<String>,
    counts: AggregateCounter<String>,
    feedback: Feedback,
    folder_tickets: HashMap<MutationId, MutationTicket<Folder>>,
    file_tickets: HashMap<MutationId, MutationTicket<FileRecord>>,
    folder_removals: HashMap<String, Removed<Folder>>,
    file_removals: HashMap<String, Removed<FileRecord>>,
    delete_gate: ConfirmGate<DeleteTarget>,
}

impl DocumentsPage {
    /// Page with its own backend worker acting as `session`.
    pub fn new(services: Services, session: Arc<dyn SessionProvider>) -> Self {
        Self::with_backend(spawn_backend(services, session))
    }

    pub fn with_backend(backend: BackendHandle) -> Self {
        Self {
            backend,
            folders: OptimisticCollection::new(),
            files: OptimisticCollection::new(),
            open_folder: None,
            counts: AggregateCounter::new(),
            feedback: Feedback::new(),
            folder_tickets: HashMap::new(),
            file_tickets: HashMap::new(),
            folder_removals: HashMap::new(),
            file_removals: HashMap::new(),
            delete_gate: ConfirmGate::default(),
        }
    }

    /// Refetch folders; item counts are reconciled from the result.
    pub fn refresh(&mut self) {
        send(&self.backend, CoreCmd::ListFolders);
    }

    /// Show the files of `folder_id`.
    ///
    /// File mutations still in flight keep their tickets across the switch so
    /// their completions can settle the folder counts.
    pub fn open_folder(&mut self, folder_id: &str) {
        if self.open_folder.as_deref() != Some(folder_id) {
            self.files.clear();
            self.open_folder = Some(folder_id.to_string());
        }
        send(
            &self.backend,
            CoreCmd::ListFiles {
                folder_id: folder_id.to_string(),
            },
        );
    }

    pub fn create_folder(&mut self, name: &str) -> PendingId {
        let pending = self.folders.apply_create(Folder::draft(name.trim().to_string()));
        send(
            &self.backend,
            CoreCmd::CreateFolder {
                pending,
                name: name.to_string(),
            },
        );
        pending
    }

    /// # Errors
    /// Returns [`SyncError`] when the folder is still pending or unknown.
    pub fn rename_folder(&mut self, folder_id: &str, name: &str) -> Result<MutationId, SyncError> {
        let patch = RenameFolderRequest {
            name: name.to_string(),
        };
        let ticket = self
            .folders
            .apply_mutate(&RecordKey::Confirmed(folder_id.to_string()), patch)?;
        let mutation = ticket.mutation;
        send(
            &self.backend,
            CoreCmd::RenameFolder {
                mutation,
                id: folder_id.to_string(),
                name: name.to_string(),
            },
        );
        self.folder_tickets.insert(mutation, ticket);
        Ok(mutation)
    }

    /// Start an upload into `folder_id`.
    ///
    /// The folder's count includes the upload right away; a placeholder row
    /// is shown only when the folder is open.
    pub fn upload(&mut self, folder_id: &str, name: &str, bytes: Vec<u8>) -> PendingId {
        let pending = if self.open_folder.as_deref() == Some(folder_id) {
            let draft = FileRecord::draft(folder_id, name, bytes.len() as u64);
            self.files.apply_create(draft)
        } else {
            self.files.reserve_pending()
        };
        self.counts.hold(&folder_id.to_string(), 1);
        send(
            &self.backend,
            CoreCmd::UploadFile {
                pending,
                folder_id: folder_id.to_string(),
                name: name.to_string(),
                bytes,
            },
        );
        pending
    }

    /// # Errors
    /// Returns [`SyncError`] when the file is still uploading or unknown.
    pub fn rename_file(&mut self, file_id: &str, name: &str) -> Result<MutationId, SyncError> {
        self.update_file(
            file_id,
            UpdateFileRequest {
                name: Some(name.to_string()),
                folder_id: None,
            },
        )
    }

    /// # Errors
    /// Returns [`SyncError`] when the file is still uploading or unknown.
    pub fn move_file(&mut self, file_id: &str, to_folder: &str) -> Result<MutationId, SyncError> {
        self.update_file(
            file_id,
            UpdateFileRequest {
                name: None,
                folder_id: Some(to_folder.to_string()),
            },
        )
    }

    fn update_file(
        &mut self,
        file_id: &str,
        update: UpdateFileRequest,
    ) -> Result<MutationId, SyncError> {
        let ticket = self
            .files
            .apply_mutate(&RecordKey::Confirmed(file_id.to_string()), update.clone())?;
        let mutation = ticket.mutation;
        if let Some((from, to)) = move_of(&ticket) {
            self.counts.hold(&from, -1);
            self.counts.hold(&to, 1);
        }
        send(
            &self.backend,
            CoreCmd::UpdateFile {
                mutation,
                id: file_id.to_string(),
                update,
            },
        );
        self.file_tickets.insert(mutation, ticket);
        Ok(mutation)
    }

    /// Stage a delete; nothing happens until [`Self::confirm_delete`].
    pub fn request_delete(&mut self, target: DeleteTarget) {
        self.delete_gate.request(target);
    }

    pub fn cancel_delete(&mut self) {
        self.delete_gate.cancel();
    }

    pub fn staged_delete(&self) -> Option<&DeleteTarget> {
        self.delete_gate.staged()
    }

    /// Run the staged delete.
    ///
    /// # Errors
    /// Returns [`SyncError::NotFound`] when nothing was staged or the target is
    /// gone, and [`SyncError::StillPending`] for unconfirmed rows.
    pub fn confirm_delete(&mut self) -> Result<(), SyncError> {
        match self.delete_gate.take().ok_or(SyncError::NotFound)? {
            DeleteTarget::Folder(id) => {
                let removed = self
                    .folders
                    .apply_delete(&RecordKey::Confirmed(id.clone()))?;
                send(&self.backend, CoreCmd::DeleteFolder { id: id.clone() });
                self.folder_removals.insert(id, removed);
            }
            DeleteTarget::File(id) => {
                let removed = self.files.apply_delete(&RecordKey::Confirmed(id.clone()))?;
                self.counts.hold(&removed.record.folder_id, -1);
                send(&self.backend, CoreCmd::DeleteFile { id: id.clone() });
                self.file_removals.insert(id, removed);
            }
        }
        Ok(())
    }

    /// Handle every queued backend event.
    ///
    /// # Returns
    /// Number of events handled.
    pub fn poll(&mut self) -> usize {
        let mut events = Vec::new();
        drain(&self.backend, |event| events.push(event));
        let handled = events.len();
        for event in events {
            self.handle_event(event);
        }
        handled
    }

    /// Wait up to `timeout` for one backend event and handle it.
    ///
    /// # Returns
    /// `true` if an event was handled.
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
            CoreEvent::FoldersLoaded { result } => match result {
                Ok(items) => {
                    self.counts
                        .reconcile_from(items.iter().map(|f| (f.id.clone(), f.item_count)));
                    self.folders.replace_confirmed(items);
                }
                Err(err) => self.feedback.set_status(err.to_string()),
            },
            CoreEvent::FolderCreated { pending, result } => match result {
                Ok(folder) => self.folders.confirm_create(pending, folder),
                Err(err) => {
                    let reason = err.to_string();
                    self.folders.reject_create(pending, &reason);
                    self.feedback.set_status(reason);
                }
            },
            CoreEvent::FolderRenamed { mutation, result } => {
                let Some(ticket) = self.folder_tickets.remove(&mutation) else {
                    return;
                };
                match result {
                    Ok(folder) => self.folders.confirm_mutate_with(&ticket, folder),
                    Err(err) => {
                        self.folders.reject_mutate(&ticket);
                        self.feedback.set_status(err.to_string());
                    }
                }
            }
            CoreEvent::FolderDeleted { id, result } => {
                let Some(removed) = self.folder_removals.remove(&id) else {
                    return;
                };
                match result {
                    Ok(_) => {
                        self.folders.confirm_delete(&id);
                        if self.open_folder.as_deref() == Some(id.as_str()) {
                            self.open_folder = None;
                            self.files.clear();
                        }
                        self.refresh();
                    }
                    Err(err) => {
                        self.folders.reject_delete(&removed);
                        self.feedback.set_status(err.to_string());
                    }
                }
            }
            CoreEvent::FilesLoaded { folder_id, result } => {
                if self.open_folder.as_deref() != Some(folder_id.as_str()) {
                    return;
                }
                match result {
                    Ok(items) => self.files.replace_confirmed(items),
                    Err(err) => self.feedback.set_status(err.to_string()),
                }
            }
            CoreEvent::FileUploaded {
                pending,
                folder_id,
                result,
            } => {
                let is_open = self.open_folder.as_deref() == Some(folder_id.as_str());
                match result {
                    Ok(file) => {
                        if is_open {
                            self.files.confirm_create(pending, file);
                        }
                        self.counts.commit(&folder_id, 1);
                        self.refresh();
                    }
                    Err(err) => {
                        let reason = err.to_string();
                        if is_open {
                            self.files.reject_create(pending, &reason);
                        }
                        self.counts.release(&folder_id, 1);
                        self.feedback.set_status(reason);
                    }
                }
            }
            CoreEvent::FileUpdated { mutation, result } => {
                let Some(ticket) = self.file_tickets.remove(&mutation) else {
                    return;
                };
                let held = move_of(&ticket);
                match result {
                    Ok(file) => {
                        let moved = ticket.previous.folder_id != file.folder_id;
                        self.files.confirm_mutate_with(&ticket, file);
                        if let Some((from, to)) = &held {
                            self.counts.commit(from, -1);
                            self.counts.commit(to, 1);
                        }
                        if moved || held.is_some() {
                            self.refresh();
                            if let Some(open) = self.open_folder.clone() {
                                self.open_folder(&open);
                            }
                        }
                    }
                    Err(err) => {
                        self.files.reject_mutate(&ticket);
                        if let Some((from, to)) = &held {
                            self.counts.release(from, -1);
                            self.counts.release(to, 1);
                        }
                        self.feedback.set_status(err.to_string());
                    }
                }
            }
            CoreEvent::FileDeleted { id, result } => {
                let Some(removed) = self.file_removals.remove(&id) else {
                    return;
                };
                match result {
                    Ok(_) => {
                        self.files.confirm_delete(&id);
                        self.counts.commit(&removed.record.folder_id, -1);
                        self.refresh();
                    }
                    Err(err) => {
                        // Restores nothing if the folder was closed meanwhile.
                        self.files.reject_delete(&removed);
                        self.counts.release(&removed.record.folder_id, -1);
                        self.feedback.set_status(err.to_string());
                    }
                }
            }
            other => tracing::debug!("documents page ignored event: {:?}", other),
        }
    }

    pub fn folders(&self) -> &OptimisticCollection<Folder> {
        &self.folders
    }

    pub fn files(&self) -> &OptimisticCollection<FileRecord> {
        &self.files
    }

    pub fn open_folder_id(&self) -> Option<&str> {
        self.open_folder.as_deref()
    }

    /// Item count shown next to a folder.
    pub fn item_count(&self, folder_id: &str) -> usize {
        self.counts.get(&folder_id.to_string())
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }
}

/// Source and target folders when `ticket` moves a file elsewhere.
fn move_of(ticket: &MutationTicket<FileRecord>) -> Option<(String, String)> {
    let to = ticket.patch.folder_id.as_ref()?;
    (*to != ticket.previous.folder_id).then(|| (ticket.previous.folder_id.clone(), to.clone()))
}

#[cfg(test)]
mod tests;
