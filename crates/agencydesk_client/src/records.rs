//! [`Record`] bindings for the core models.

use crate::optimistic::Record;
use agencydesk_core::models::file::{FileRecord, UpdateFileRequest};
use agencydesk_core::models::folder::{Folder, RenameFolderRequest};
use agencydesk_core::models::quote::{Quote, QuotePatch};
use agencydesk_core::models::task::{Task, TaskPatch};
use chrono::Utc;

impl Record for Folder {
    type Id = String;
    type Patch = RenameFolderRequest;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn apply_patch(&mut self, patch: &RenameFolderRequest) {
        self.name = patch.name.trim().to_string();
    }
}

impl Record for FileRecord {
    type Id = String;
    type Patch = UpdateFileRequest;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn apply_patch(&mut self, patch: &UpdateFileRequest) {
        self.apply_update(patch);
    }
}

impl Record for Task {
    type Id = String;
    type Patch = TaskPatch;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn apply_patch(&mut self, patch: &TaskPatch) {
        patch.apply_to(self, Utc::now());
    }
}

impl Record for Quote {
    type Id = String;
    type Patch = QuotePatch;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn apply_patch(&mut self, patch: &QuotePatch) {
        patch.apply_to(self, Utc::now());
    }
}
