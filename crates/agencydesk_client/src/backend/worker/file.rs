//! File command handlers for the backend worker.

use super::{log_outcome, WorkerState};
use crate::backend::CoreEvent;
use crate::optimistic::{MutationId, PendingId};
use agencydesk_core::actions::file;
use agencydesk_core::models::file::{UpdateFileRequest, UploadFileRequest};

pub(super) fn handle_list_files(state: &mut WorkerState, folder_id: String) {
    let result = file::list_files(&state.services, state.session(), &folder_id).into_result();
    log_outcome("list files", &result);
    state.send(CoreEvent::FilesLoaded { folder_id, result });
}

pub(super) fn handle_upload_file(
    state: &mut WorkerState,
    pending: PendingId,
    folder_id: String,
    name: String,
    bytes: Vec<u8>,
) {
    let request = UploadFileRequest {
        folder_id,
        name,
        bytes,
    };
    let result = file::upload_file(&state.services, state.session(), &request).into_result();
    log_outcome("upload file", &result);
    state.send(CoreEvent::FileUploaded {
        pending,
        folder_id: request.folder_id,
        result,
    });
}

pub(super) fn handle_update_file(
    state: &mut WorkerState,
    mutation: MutationId,
    id: String,
    update: UpdateFileRequest,
) {
    let result =
        file::update_file_request(&state.services, state.session(), &id, &update).into_result();
    log_outcome("update file", &result);
    state.send(CoreEvent::FileUpdated { mutation, result });
}

pub(super) fn handle_delete_file(state: &mut WorkerState, id: String) {
    let result = file::delete_file(&state.services, state.session(), &id).into_result();
    log_outcome("delete file", &result);
    state.send(CoreEvent::FileDeleted { id, result });
}
