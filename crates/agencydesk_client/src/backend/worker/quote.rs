//! Quote and invoice command handlers for the backend worker.

use super::{log_outcome, WorkerState};
use crate::backend::CoreEvent;
use crate::optimistic::{MutationId, PendingId};
use agencydesk_core::actions::quote;
use agencydesk_core::models::quote::{CreateQuoteRequest, QuotePatch};

pub(super) fn handle_list_quotes(state: &mut WorkerState) {
    let result = quote::list_quotes(&state.services, state.session()).into_result();
    log_outcome("list quotes", &result);
    state.send(CoreEvent::QuotesLoaded { result });
}

pub(super) fn handle_create_quote(
    state: &mut WorkerState,
    pending: PendingId,
    request: CreateQuoteRequest,
) {
    let result = quote::create_quote(&state.services, state.session(), &request).into_result();
    log_outcome("create quote", &result);
    state.send(CoreEvent::QuoteCreated { pending, result });
}

pub(super) fn handle_update_quote(
    state: &mut WorkerState,
    mutation: MutationId,
    id: String,
    patch: QuotePatch,
) {
    let result = quote::update_quote(&state.services, state.session(), &id, &patch).into_result();
    log_outcome("update quote", &result);
    state.send(CoreEvent::QuoteUpdated { mutation, result });
}

pub(super) fn handle_convert_to_invoice(
    state: &mut WorkerState,
    pending: PendingId,
    quote_id: String,
) {
    let result =
        quote::convert_to_invoice(&state.services, state.session(), &quote_id).into_result();
    log_outcome("convert to invoice", &result);
    state.send(CoreEvent::InvoiceCreated { pending, result });
}

pub(super) fn handle_delete_quote(state: &mut WorkerState, id: String) {
    let result = quote::delete_quote(&state.services, state.session(), &id).into_result();
    log_outcome("delete quote", &result);
    state.send(CoreEvent::QuoteDeleted { id, result });
}
