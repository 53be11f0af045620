//! Background worker thread for action execution.

use crate::backend::{CoreCmd, CoreEvent, Outcome};
use agencydesk_core::{identity::SessionProvider, Services};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

mod file;
mod folder;
mod quote;
mod task;

/// Handle for sending commands to, and receiving events from, the backend worker.
pub struct BackendHandle {
    pub cmd_tx: Sender<CoreCmd>,
    pub evt_rx: Receiver<CoreEvent>,
}

pub(super) struct WorkerState {
    services: Services,
    session: Arc<dyn SessionProvider>,
    evt_tx: Sender<CoreEvent>,
}

impl WorkerState {
    fn session(&self) -> &dyn SessionProvider {
        self.session.as_ref()
    }

    fn send(&self, event: CoreEvent) {
        // The page may have been dropped; late completions are discarded.
        let _ = self.evt_tx.send(event);
    }
}

/// Log a rejected action before it is handed back to the page.
fn log_outcome<T>(intent: &str, outcome: &Outcome<T>) {
    if let Err(err) = outcome {
        error!("backend {} failed: {}", intent, err);
    }
}

/// Spawn the backend worker thread that runs actions off the caller's thread.
///
/// Commands are processed in arrival order; the worker replies with
/// [`CoreEvent`] values that the page polls.
///
/// # Returns
/// A [`BackendHandle`] containing the command sender and event receiver.
///
/// # Panics
/// Panics if the worker thread cannot be spawned.
pub fn spawn_backend(services: Services, session: Arc<dyn SessionProvider>) -> BackendHandle {
    let (cmd_tx, cmd_rx) = unbounded();
    let (evt_tx, evt_rx) = unbounded();

    thread::Builder::new()
        .name("agencydesk-backend".to_string())
        .spawn(move || {
            let mut state = WorkerState {
                services,
                session,
                evt_tx,
            };
            for cmd in cmd_rx.iter() {
                dispatch(&mut state, cmd);
            }
            info!("backend worker stopped");
        })
        .expect("spawn backend thread");

    BackendHandle { cmd_tx, evt_rx }
}

fn dispatch(state: &mut WorkerState, cmd: CoreCmd) {
    match cmd {
        CoreCmd::ListFolders => folder::handle_list_folders(state),
        CoreCmd::CreateFolder { pending, name } => {
            folder::handle_create_folder(state, pending, name)
        }
        CoreCmd::RenameFolder { mutation, id, name } => {
            folder::handle_rename_folder(state, mutation, id, name)
        }
        CoreCmd::DeleteFolder { id } => folder::handle_delete_folder(state, id),
        CoreCmd::ListFiles { folder_id } => file::handle_list_files(state, folder_id),
        CoreCmd::UploadFile {
            pending,
            folder_id,
            name,
            bytes,
        } => file::handle_upload_file(state, pending, folder_id, name, bytes),
        CoreCmd::UpdateFile {
            mutation,
            id,
            update,
        } => file::handle_update_file(state, mutation, id, update),
        CoreCmd::DeleteFile { id } => file::handle_delete_file(state, id),
        CoreCmd::ListTasks => task::handle_list_tasks(state),
        CoreCmd::CreateTask { pending, request } => {
            task::handle_create_task(state, pending, request)
        }
        CoreCmd::UpdateTask {
            mutation,
            id,
            patch,
        } => task::handle_update_task(state, mutation, id, patch),
        CoreCmd::DeleteTask { id } => task::handle_delete_task(state, id),
        CoreCmd::ListQuotes => quote::handle_list_quotes(state),
        CoreCmd::CreateQuote { pending, request } => {
            quote::handle_create_quote(state, pending, request)
        }
        CoreCmd::UpdateQuote {
            mutation,
            id,
            patch,
        } => quote::handle_update_quote(state, mutation, id, patch),
        CoreCmd::ConvertToInvoice { pending, quote_id } => {
            quote::handle_convert_to_invoice(state, pending, quote_id)
        }
        CoreCmd::DeleteQuote { id } => quote::handle_delete_quote(state, id),
    }
}
