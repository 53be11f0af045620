//! Root crate facade for the AgencyDesk core, client pages and HTTP server.

pub use agencydesk_client::{aggregate, backend, feedback, optimistic, pages};
pub use agencydesk_core::{actions, booking, config, constants, db, identity, models, storage};

pub use agencydesk_client::{DocumentsPage, QuotesPage, TaskBoard};
pub use agencydesk_core::{
    ActionError, ActionResult, Config, Database, FsObjectStore, Identity, Services,
    SessionProvider, StaticSession,
};
pub use agencydesk_server::{create_app, serve_router, AppState};
