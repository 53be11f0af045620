//! Protocol types for the page backend worker.
//!
//! Every command carries the token the page needs to reconcile its outcome:
//! a [`PendingId`] for creates, a [`MutationId`] for patches and the record id
//! for deletes. Completions may arrive in any order.

use crate::optimistic::{MutationId, PendingId};
use agencydesk_core::models::{
    file::{FileRecord, UpdateFileRequest},
    folder::Folder,
    quote::{CreateQuoteRequest, Quote, QuotePatch},
    task::{CreateTaskRequest, Task, TaskPatch},
    Deleted,
};
use agencydesk_core::ActionError;

pub type Outcome<T> = Result<T, ActionError>;

/// Commands issued by a page controller for the backend worker to execute.
#[derive(Debug)]
pub enum CoreCmd {
    /// Load the caller's folders with their item counts.
    ListFolders,
    CreateFolder {
        pending: PendingId,
        name: String,
    },
    RenameFolder {
        mutation: MutationId,
        id: String,
        name: String,
    },
    /// Delete a folder together with its files and stored objects.
    DeleteFolder {
        id: String,
    },
    ListFiles {
        folder_id: String,
    },
    /// Upload bytes to object storage, then record the file row.
    UploadFile {
        pending: PendingId,
        folder_id: String,
        name: String,
        bytes: Vec<u8>,
    },
    /// Rename and/or move a file.
    UpdateFile {
        mutation: MutationId,
        id: String,
        update: UpdateFileRequest,
    },
    DeleteFile {
        id: String,
    },
    ListTasks,
    CreateTask {
        pending: PendingId,
        request: CreateTaskRequest,
    },
    UpdateTask {
        mutation: MutationId,
        id: String,
        patch: TaskPatch,
    },
    DeleteTask {
        id: String,
    },
    ListQuotes,
    CreateQuote {
        pending: PendingId,
        request: CreateQuoteRequest,
    },
    UpdateQuote {
        mutation: MutationId,
        id: String,
        patch: QuotePatch,
    },
    /// Issue an invoice from an accepted quote.
    ConvertToInvoice {
        pending: PendingId,
        quote_id: String,
    },
    DeleteQuote {
        id: String,
    },
}

/// Events produced by the backend worker and polled by the page.
#[derive(Debug)]
pub enum CoreEvent {
    FoldersLoaded {
        result: Outcome<Vec<Folder>>,
    },
    FolderCreated {
        pending: PendingId,
        result: Outcome<Folder>,
    },
    FolderRenamed {
        mutation: MutationId,
        result: Outcome<Folder>,
    },
    FolderDeleted {
        id: String,
        result: Outcome<Deleted>,
    },
    FilesLoaded {
        folder_id: String,
        result: Outcome<Vec<FileRecord>>,
    },
    FileUploaded {
        pending: PendingId,
        folder_id: String,
        result: Outcome<FileRecord>,
    },
    FileUpdated {
        mutation: MutationId,
        result: Outcome<FileRecord>,
    },
    FileDeleted {
        id: String,
        result: Outcome<Deleted>,
    },
    TasksLoaded {
        result: Outcome<Vec<Task>>,
    },
    TaskCreated {
        pending: PendingId,
        result: Outcome<Task>,
    },
    TaskUpdated {
        mutation: MutationId,
        result: Outcome<Task>,
    },
    TaskDeleted {
        id: String,
        result: Outcome<Deleted>,
    },
    QuotesLoaded {
        result: Outcome<Vec<Quote>>,
    },
    QuoteCreated {
        pending: PendingId,
        result: Outcome<Quote>,
    },
    QuoteUpdated {
        mutation: MutationId,
        result: Outcome<Quote>,
    },
    InvoiceCreated {
        pending: PendingId,
        result: Outcome<Quote>,
    },
    QuoteDeleted {
        id: String,
        result: Outcome<Deleted>,
    },
}
