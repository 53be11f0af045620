//! Page controllers.
//!
//! Each page owns its collections, counters and feedback, and talks to its own
//! backend worker. Nothing here is global: two pages never share state.

/// Folder and file manager.
pub mod documents;
/// Quote and invoice list.
pub mod quotes;
/// Kanban task board.
pub mod tasks;

use crate::backend::{BackendHandle, CoreCmd, CoreEvent};
use crossbeam_channel::{RecvTimeoutError, TryRecvError};
use std::time::Duration;

pub use documents::DocumentsPage;
pub use quotes::QuotesPage;
pub use tasks::TaskBoard;

/// Two-step confirmation for destructive intents.
///
/// A target is staged with [`ConfirmGate::request`] and only released by
/// [`ConfirmGate::take`]; nothing is deleted until then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmGate<K> {
    staged: Option<K>,
}

impl<K> Default for ConfirmGate<K> {
    fn default() -> Self {
        Self { staged: None }
    }
}

impl<K> ConfirmGate<K> {
    pub fn request(&mut self, target: K) {
        self.staged = Some(target);
    }

    pub fn take(&mut self) -> Option<K> {
        self.staged.take()
    }

    pub fn cancel(&mut self) {
        self.staged = None;
    }

    pub fn staged(&self) -> Option<&K> {
        self.staged.as_ref()
    }
}

fn send(backend: &BackendHandle, cmd: CoreCmd) {
    if backend.cmd_tx.send(cmd).is_err() {
        tracing::error!("backend worker unavailable");
    }
}

/// Drain every event that is already queued.
fn drain(backend: &BackendHandle, mut handle: impl FnMut(CoreEvent)) -> usize {
    let mut handled = 0;
    loop {
        match backend.evt_rx.try_recv() {
            Ok(event) => {
                handle(event);
                handled += 1;
            }
            Err(TryRecvError::Empty) => return handled,
            Err(TryRecvError::Disconnected) => {
                tracing::error!("backend worker disconnected");
                return handled;
            }
        }
    }
}

/// Block for at most `timeout` waiting for a single event.
fn wait_one(backend: &BackendHandle, timeout: Duration) -> Option<CoreEvent> {
    match backend.evt_rx.recv_timeout(timeout) {
        Ok(event) => Some(event),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => {
            tracing::error!("backend worker disconnected");
            None
        }
    }
}
