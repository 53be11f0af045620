//! Folder records for the document manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Folder row. `item_count` shadows the number of files stored in it and is
/// maintained by the datastore in the same transaction as file mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub item_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
}

/// Request payload for renaming a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameFolderRequest {
    pub name: String,
}

impl Folder {
    /// Create a new, empty folder owned by `owner_id`.
    pub fn new(owner_id: impl Into<String>, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            name,
            item_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Unsaved folder used as an optimistic placeholder.
    pub fn draft(name: String) -> Self {
        let mut folder = Self::new(String::new(), name);
        folder.id = String::new();
        folder
    }
}
