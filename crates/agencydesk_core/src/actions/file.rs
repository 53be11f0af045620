//! File intents. Upload is the only multi-step action: the object is stored
//! first, then the metadata row is inserted.

use super::{finish, owned, require_identity, validate_name, ActionError, ActionResult, Services};
use crate::db::TransactionOps;
use crate::format::{display_date, size_label};
use crate::identity::{Identity, SessionProvider};
use crate::models::file::{
    guess_mime_type, FileRecord, FileStatus, UpdateFileRequest, UploadFileRequest,
};
use crate::models::Deleted;
use crate::storage::object_path;
use chrono::Utc;
use uuid::Uuid;

/// Fill in the display fields derived from the stored row.
fn normalize(services: &Services, mut file: FileRecord) -> FileRecord {
    file.size_label = size_label(file.size_bytes);
    file.uploaded_label = display_date(file.created_at);
    file.public_url = (!file.storage_path.is_empty())
        .then(|| services.storage.public_url(&file.storage_path));
    file
}

fn ensure_folder_owned(
    services: &Services,
    identity: &Identity,
    folder_id: &str,
) -> Result<(), ActionError> {
    owned(services.db.folders.get(folder_id)?, identity, |f| {
        f.owner_id.as_str()
    })?;
    Ok(())
}

/// List files in one of the caller's folders, newest first.
pub fn list_files(
    services: &Services,
    session: &dyn SessionProvider,
    folder_id: &str,
) -> ActionResult<Vec<FileRecord>> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        ensure_folder_owned(services, &identity, folder_id)?;
        let rows = services
            .db
            .files
            .list_for_folder(&identity.user_id, folder_id)?;
        Ok(rows.into_iter().map(|f| normalize(services, f)).collect())
    })();
    finish("list_files", result)
}

/// Store the bytes, then record the file in its folder.
///
/// A storage rejection is reported verbatim (e.g. `quota exceeded`). When the
/// metadata insert fails after a successful upload, the stored object is
/// removed again and the action reports [`ActionError::PartialFailure`].
pub fn upload_file(
    services: &Services,
    session: &dyn SessionProvider,
    request: &UploadFileRequest,
) -> ActionResult<FileRecord> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        let name = validate_name("file name", &request.name)?;
        if request.bytes.len() > services.max_upload_size {
            return Err(ActionError::ValidationFailed(format!(
                "file exceeds the {} upload limit",
                size_label(services.max_upload_size as u64)
            )));
        }
        ensure_folder_owned(services, &identity, &request.folder_id)?;

        let now = Utc::now();
        let path = object_path(&identity.user_id, &request.folder_id, now, &name);
        services.storage.upload(&path, &request.bytes)?;

        let record = FileRecord {
            id: Uuid::new_v4().to_string(),
            owner_id: identity.user_id.clone(),
            folder_id: request.folder_id.clone(),
            mime_type: guess_mime_type(&name),
            name,
            size_bytes: request.bytes.len() as u64,
            storage_path: path.clone(),
            status: FileStatus::Ready,
            size_label: String::new(),
            public_url: None,
            uploaded_label: String::new(),
            created_at: now,
            updated_at: now,
        };

        if let Err(err) = TransactionOps::create_file_with_folder(&services.db, &record) {
            if let Err(cleanup_err) = services.storage.remove(std::slice::from_ref(&path)) {
                tracing::warn!("Failed to remove orphaned object '{}': {}", path, cleanup_err);
            }
            return Err(ActionError::PartialFailure(format!(
                "upload stored but could not be recorded: {}",
                err
            )));
        }
        Ok(normalize(services, record))
    })();
    finish("upload_file", result)
}

fn update_file(
    services: &Services,
    identity: &Identity,
    file_id: &str,
    update: &UpdateFileRequest,
) -> Result<FileRecord, ActionError> {
    owned(services.db.files.get(file_id)?, identity, |f| {
        f.owner_id.as_str()
    })?;
    if let Some(folder_id) = &update.folder_id {
        ensure_folder_owned(services, identity, folder_id)?;
    }
    let updated = TransactionOps::update_file_with_folders(&services.db, file_id, update)?
        .ok_or(ActionError::NotFound)?;
    Ok(normalize(services, updated))
}

pub fn rename_file(
    services: &Services,
    session: &dyn SessionProvider,
    file_id: &str,
    name: &str,
) -> ActionResult<FileRecord> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        let name = validate_name("file name", name)?;
        let update = UpdateFileRequest {
            name: Some(name),
            folder_id: None,
        };
        update_file(services, &identity, file_id, &update)
    })();
    finish("rename_file", result)
}

/// Move a file to another of the caller's folders.
pub fn move_file(
    services: &Services,
    session: &dyn SessionProvider,
    file_id: &str,
    to_folder_id: &str,
) -> ActionResult<FileRecord> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        if to_folder_id.trim().is_empty() {
            return Err(ActionError::ValidationFailed(
                "destination folder is required".to_string(),
            ));
        }
        let update = UpdateFileRequest {
            name: None,
            folder_id: Some(to_folder_id.to_string()),
        };
        update_file(services, &identity, file_id, &update)
    })();
    finish("move_file", result)
}

/// Apply a combined rename/move request.
pub fn update_file_request(
    services: &Services,
    session: &dyn SessionProvider,
    file_id: &str,
    update: &UpdateFileRequest,
) -> ActionResult<FileRecord> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        let mut update = update.clone();
        if let Some(name) = &update.name {
            update.name = Some(validate_name("file name", name)?);
        }
        update_file(services, &identity, file_id, &update)
    })();
    finish("update_file", result)
}

/// Delete the metadata row, then the stored object.
///
/// The object is removed best effort after the row is gone; a storage failure
/// is logged rather than reported.
pub fn delete_file(
    services: &Services,
    session: &dyn SessionProvider,
    file_id: &str,
) -> ActionResult<Deleted> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        owned(services.db.files.get(file_id)?, &identity, |f| {
            f.owner_id.as_str()
        })?;
        let removed = TransactionOps::delete_file_with_folder(&services.db, file_id)?
            .ok_or(ActionError::NotFound)?;
        if let Err(err) = services
            .storage
            .remove(std::slice::from_ref(&removed.storage_path))
        {
            tracing::warn!(
                "Failed to remove object '{}' for deleted file: {}",
                removed.storage_path,
                err
            );
        }
        Ok(Deleted { id: removed.id })
    })();
    finish("delete_file", result)
}
