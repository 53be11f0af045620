//! Folder HTTP handlers.

use super::{respond, ApiResult};
use crate::{session::HeaderSession, AppState};
use agencydesk_core::actions::folder;
use agencydesk_core::models::folder::{CreateFolderRequest, Folder, RenameFolderRequest};
use agencydesk_core::models::Deleted;
use axum::{
    extract::{Path, State},
    Json,
};

/// List the caller's folders.
///
/// # Returns
/// Folders with their item counts.
///
/// # Errors
/// Returns 401 without a session.
pub async fn list_folders(
    State(state): State<AppState>,
    session: HeaderSession,
) -> ApiResult<Vec<Folder>> {
    respond(folder::list_folders(&state.services, &session))
}

/// Create a folder.
///
/// # Arguments
/// - `state`: Application state.
/// - `session`: Caller identity from request headers.
/// - `req`: Folder creation payload.
///
/// # Returns
/// The created folder.
///
/// # Errors
/// Returns 401 without a session and 422 for an invalid name.
pub async fn create_folder(
    State(state): State<AppState>,
    session: HeaderSession,
    Json(req): Json<CreateFolderRequest>,
) -> ApiResult<Folder> {
    respond(folder::create_folder(&state.services, &session, &req))
}

pub async fn rename_folder(
    State(state): State<AppState>,
    session: HeaderSession,
    Path(id): Path<String>,
    Json(req): Json<RenameFolderRequest>,
) -> ApiResult<Folder> {
    respond(folder::rename_folder(&state.services, &session, &id, &req))
}

/// Delete a folder with its files.
///
/// # Errors
/// Returns 404 when the folder does not exist or belongs to someone else.
pub async fn delete_folder(
    State(state): State<AppState>,
    session: HeaderSession,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    respond(folder::delete_folder(&state.services, &session, &id))
}
