//! Folder intents.

use super::{finish, owned, require_identity, validate_name, ActionError, ActionResult, Services};
use crate::db::TransactionOps;
use crate::identity::SessionProvider;
use crate::models::folder::{CreateFolderRequest, Folder, RenameFolderRequest};
use crate::models::Deleted;

/// List the caller's folders with their stored item counts.
pub fn list_folders(
    services: &Services,
    session: &dyn SessionProvider,
) -> ActionResult<Vec<Folder>> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        Ok(services.db.folders.list_for_owner(&identity.user_id)?)
    })();
    finish("list_folders", result)
}

pub fn create_folder(
    services: &Services,
    session: &dyn SessionProvider,
    request: &CreateFolderRequest,
) -> ActionResult<Folder> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        let name = validate_name("folder name", &request.name)?;
        let folder = Folder::new(identity.user_id, name);
        services.db.folders.create(&folder)?;
        Ok(folder)
    })();
    finish("create_folder", result)
}

pub fn rename_folder(
    services: &Services,
    session: &dyn SessionProvider,
    folder_id: &str,
    request: &RenameFolderRequest,
) -> ActionResult<Folder> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        let name = validate_name("folder name", &request.name)?;
        owned(services.db.folders.get(folder_id)?, &identity, |f| {
            f.owner_id.as_str()
        })?;
        services
            .db
            .folders
            .rename(folder_id, &name)?
            .ok_or(ActionError::NotFound)
    })();
    finish("rename_folder", result)
}

/// Delete a folder, its file rows and their stored objects.
///
/// Object removal is best effort once the rows are gone; failures are logged.
pub fn delete_folder(
    services: &Services,
    session: &dyn SessionProvider,
    folder_id: &str,
) -> ActionResult<Deleted> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        owned(services.db.folders.get(folder_id)?, &identity, |f| {
            f.owner_id.as_str()
        })?;
        let removed = TransactionOps::delete_folder_with_files(&services.db, folder_id)?
            .ok_or(ActionError::NotFound)?;

        let paths: Vec<String> = removed.into_iter().map(|f| f.storage_path).collect();
        if !paths.is_empty() {
            if let Err(err) = services.storage.remove(&paths) {
                tracing::warn!(
                    "Failed to remove {} object(s) for deleted folder '{}': {}",
                    paths.len(),
                    folder_id,
                    err
                );
            }
        }
        Ok(Deleted {
            id: folder_id.to_string(),
        })
    })();
    finish("delete_folder", result)
}
