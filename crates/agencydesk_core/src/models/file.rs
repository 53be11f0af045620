//! Uploaded file records.

use crate::format::{display_date, size_label};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle of a file row as shown in lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FileStatus {
    Uploading,
    Ready,
}

/// File metadata row. The bytes live in object storage at `storage_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub owner_id: String,
    pub folder_id: String,
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub storage_path: String,
    pub status: FileStatus,
    pub size_label: String,
    pub public_url: Option<String>,
    pub uploaded_label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upload intent. Carries raw bytes, so it is not part of the JSON surface.
#[derive(Debug, Clone)]
pub struct UploadFileRequest {
    pub folder_id: String,
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Rename and/or move a file. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateFileRequest {
    pub name: Option<String>,
    pub folder_id: Option<String>,
}

impl FileRecord {
    /// Unsaved file row shown while the upload is in flight.
    pub fn draft(folder_id: &str, name: &str, size_bytes: u64) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            owner_id: String::new(),
            folder_id: folder_id.to_string(),
            name: name.to_string(),
            size_bytes,
            mime_type: guess_mime_type(name),
            storage_path: String::new(),
            status: FileStatus::Uploading,
            size_label: size_label(size_bytes),
            public_url: None,
            uploaded_label: display_date(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a rename/move request in place.
    pub fn apply_update(&mut self, update: &UpdateFileRequest) {
        if let Some(name) = &update.name {
            self.name = name.trim().to_string();
        }
        if let Some(folder_id) = &update.folder_id {
            self.folder_id = folder_id.clone();
        }
        self.updated_at = Utc::now();
    }
}

/// Best-effort MIME type from the file extension.
pub fn guess_mime_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
