//! Public booking widget and contact form handlers. No session required.

use super::{respond, ApiResult};
use crate::AppState;
use agencydesk_core::actions::booking;
use agencydesk_core::booking::PromoCode;
use agencydesk_core::models::booking::{
    Availability, Booking, BookingRequest, ContactRequest, PromoCheckRequest,
};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

/// Open slots on a day, after removing calendar conflicts and bookings.
///
/// # Errors
/// Returns 502 when the calendar webhook fails.
pub async fn availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Availability> {
    let busy = state.integrations.busy_slots(query.date).await?;
    respond(booking::availability(
        &state.services,
        query.date,
        &busy,
        Utc::now(),
    ))
}

pub async fn validate_promo(
    State(state): State<AppState>,
    Json(req): Json<PromoCheckRequest>,
) -> ApiResult<PromoCode> {
    respond(booking::validate_promo(&state.services, &req.code))
}

/// Book a slot.
///
/// The slot is checked against the calendar before it is stored; the email
/// relay is notified afterwards without waiting.
pub async fn submit_booking(
    State(state): State<AppState>,
    Json(req): Json<BookingRequest>,
) -> ApiResult<Booking> {
    let busy = state.integrations.busy_slots(req.date).await?;
    let response = respond(booking::submit_booking(
        &state.services,
        &req,
        &busy,
        Utc::now(),
    ))?;
    if let Some(booking) = response.data.as_ref() {
        state.integrations.notify("booking", booking);
    }
    Ok(response)
}

pub async fn submit_contact(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> ApiResult<ContactRequest> {
    let response = respond(booking::submit_contact(&req))?;
    if let Some(contact) = response.data.as_ref() {
        state.integrations.notify("contact", contact);
    }
    Ok(response)
}
