//! Folder command handlers for the backend worker.

use super::{log_outcome, WorkerState};
use crate::backend::CoreEvent;
use crate::optimistic::{MutationId, PendingId};
use agencydesk_core::actions::folder;
use agencydesk_core::models::folder::{CreateFolderRequest, RenameFolderRequest};

pub(super) fn handle_list_folders(state: &mut WorkerState) {
    let result = folder::list_folders(&state.services, state.session()).into_result();
    log_outcome("list folders", &result);
    state.send(CoreEvent::FoldersLoaded { result });
}

pub(super) fn handle_create_folder(state: &mut WorkerState, pending: PendingId, name: String) {
    let request = CreateFolderRequest { name };
    let result = folder::create_folder(&state.services, state.session(), &request).into_result();
    log_outcome("create folder", &result);
    state.send(CoreEvent::FolderCreated { pending, result });
}

pub(super) fn handle_rename_folder(
    state: &mut WorkerState,
    mutation: MutationId,
    id: String,
    name: String,
) {
    let request = RenameFolderRequest { name };
    let result =
        folder::rename_folder(&state.services, state.session(), &id, &request).into_result();
    log_outcome("rename folder", &result);
    state.send(CoreEvent::FolderRenamed { mutation, result });
}

pub(super) fn handle_delete_folder(state: &mut WorkerState, id: String) {
    let result = folder::delete_folder(&state.services, state.session(), &id).into_result();
    log_outcome("delete folder", &result);
    state.send(CoreEvent::FolderDeleted { id, result });
}
