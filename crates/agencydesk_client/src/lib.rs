//! Client-side state for AgencyDesk pages.
//!
//! Pages keep an optimistic view of their records, run actions on a background
//! worker, and reconcile the view as each action completes.

/// Client-side derived counters.
pub mod aggregate;
/// Background worker and its command/event protocol.
pub mod backend;
/// Status banner and toasts.
pub mod feedback;
/// Optimistic collection controller.
pub mod optimistic;
/// Page controllers.
pub mod pages;
mod records;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregate::AggregateCounter;
pub use feedback::Feedback;
pub use optimistic::{
    ItemState, MutationId, MutationTicket, OptimisticCollection, PendingId, Record, RecordKey,
    Removed, SyncError,
};
pub use pages::{DocumentsPage, QuotesPage, TaskBoard};
