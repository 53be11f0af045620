//! Backend worker wiring for the page controllers.
//!
//! This module exposes the command/event protocol plus the worker spawn helper
//! used by the pages.

mod protocol;
mod worker;

pub use protocol::{CoreCmd, CoreEvent, Outcome};
pub use worker::{spawn_backend, BackendHandle};
