//! Quote and invoice HTTP handlers.

use super::{respond, ApiResult};
use crate::{session::HeaderSession, AppState};
use agencydesk_core::actions::quote;
use agencydesk_core::models::quote::{CreateQuoteRequest, Quote, QuotePatch};
use agencydesk_core::models::Deleted;
use axum::{
    extract::{Path, State},
    Json,
};

pub async fn list_quotes(
    State(state): State<AppState>,
    session: HeaderSession,
) -> ApiResult<Vec<Quote>> {
    respond(quote::list_quotes(&state.services, &session))
}

/// Create a quote (or an invoice when `kind` is `invoice`).
///
/// # Returns
/// The stored document with its assigned number.
pub async fn create_quote(
    State(state): State<AppState>,
    session: HeaderSession,
    Json(req): Json<CreateQuoteRequest>,
) -> ApiResult<Quote> {
    respond(quote::create_quote(&state.services, &session, &req))
}

pub async fn update_quote(
    State(state): State<AppState>,
    session: HeaderSession,
    Path(id): Path<String>,
    Json(patch): Json<QuotePatch>,
) -> ApiResult<Quote> {
    respond(quote::update_quote(&state.services, &session, &id, &patch))
}

/// Issue an invoice from an accepted quote.
///
/// # Errors
/// Returns 422 unless the source is an accepted quote.
pub async fn convert_to_invoice(
    State(state): State<AppState>,
    session: HeaderSession,
    Path(id): Path<String>,
) -> ApiResult<Quote> {
    respond(quote::convert_to_invoice(&state.services, &session, &id))
}

pub async fn delete_quote(
    State(state): State<AppState>,
    session: HeaderSession,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    respond(quote::delete_quote(&state.services, &session, &id))
}
