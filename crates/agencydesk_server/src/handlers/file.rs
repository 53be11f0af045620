//! File HTTP handlers. Uploads take the raw bytes as the request body.

use super::{respond, ApiResult};
use crate::{session::HeaderSession, AppState};
use agencydesk_core::actions::file;
use agencydesk_core::models::file::{FileRecord, UpdateFileRequest, UploadFileRequest};
use agencydesk_core::models::Deleted;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub name: String,
}

pub async fn list_files(
    State(state): State<AppState>,
    session: HeaderSession,
    Path(folder_id): Path<String>,
) -> ApiResult<Vec<FileRecord>> {
    respond(file::list_files(&state.services, &session, &folder_id))
}

/// Upload a file into a folder.
///
/// # Arguments
/// - `folder_id`: Destination folder from the path.
/// - `query`: `?name=` with the original file name.
/// - `body`: File contents.
///
/// # Returns
/// The recorded file with its size label and public URL.
///
/// # Errors
/// Storage rejections (for example `quota exceeded`) map to 502; a metadata
/// failure after the object was stored maps to 500.
pub async fn upload_file(
    State(state): State<AppState>,
    session: HeaderSession,
    Path(folder_id): Path<String>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> ApiResult<FileRecord> {
    let request = UploadFileRequest {
        folder_id,
        name: query.name,
        bytes: body.to_vec(),
    };
    respond(file::upload_file(&state.services, &session, &request))
}

/// Rename and/or move a file.
pub async fn update_file(
    State(state): State<AppState>,
    session: HeaderSession,
    Path(id): Path<String>,
    Json(req): Json<UpdateFileRequest>,
) -> ApiResult<FileRecord> {
    respond(file::update_file_request(&state.services, &session, &id, &req))
}

pub async fn delete_file(
    State(state): State<AppState>,
    session: HeaderSession,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    respond(file::delete_file(&state.services, &session, &id))
}
