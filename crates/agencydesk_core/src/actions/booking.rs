//! Public booking widget and contact form intents.
//!
//! These come from the marketing site and do not require a session.

use super::{finish, validate_email, validate_name, ActionError, ActionResult, Services};
use crate::booking::{available_slots, BusySlot, PromoCode};
use crate::models::booking::{Availability, Booking, BookingRequest, ContactRequest};
use crate::models::normalize_optional;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

/// Longest accepted contact message, in characters.
const MAX_MESSAGE_LEN: usize = 5_000;

/// Calendar busy time plus bookings already stored for `date`.
fn busy_with_bookings(
    services: &Services,
    date: NaiveDate,
    calendar_busy: &[BusySlot],
) -> Result<Vec<BusySlot>, ActionError> {
    let mut busy = calendar_busy.to_vec();
    for booking in services.db.bookings.list_for_date(date)? {
        let start = booking.date.and_time(booking.time).and_utc();
        busy.push(BusySlot {
            start,
            end: start + Duration::minutes(i64::from(booking.duration_minutes)),
        });
    }
    Ok(busy)
}

/// Free slots on `date`, given the calendar's busy intervals.
pub fn availability(
    services: &Services,
    date: NaiveDate,
    calendar_busy: &[BusySlot],
    now: DateTime<Utc>,
) -> ActionResult<Availability> {
    let result = (|| -> Result<_, ActionError> {
        let busy = busy_with_bookings(services, date, calendar_busy)?;
        let slots = available_slots(date, &services.business_hours, &busy, now)
            .into_iter()
            .map(|time| time.format("%H:%M").to_string())
            .collect();
        Ok(Availability {
            date,
            slot_minutes: services.business_hours.slot_minutes,
            slots,
        })
    })();
    finish("availability", result)
}

/// Look up a promo code case-insensitively.
pub fn validate_promo(services: &Services, code: &str) -> ActionResult<PromoCode> {
    let result = (|| -> Result<_, ActionError> {
        if code.trim().is_empty() {
            return Err(ActionError::ValidationFailed(
                "promo code is required".to_string(),
            ));
        }
        services
            .promo_codes
            .lookup(code)
            .cloned()
            .ok_or_else(|| ActionError::ValidationFailed("unknown promo code".to_string()))
    })();
    finish("validate_promo", result)
}

/// Book a discovery call.
///
/// The requested time must be one of the free slots for the date, and any promo
/// code must be known; the applied discount is stored on the booking.
pub fn submit_booking(
    services: &Services,
    request: &BookingRequest,
    calendar_busy: &[BusySlot],
    now: DateTime<Utc>,
) -> ActionResult<Booking> {
    let result = (|| -> Result<_, ActionError> {
        let name = validate_name("name", &request.name)?;
        let email = validate_email(&request.email)?;

        let promo = match normalize_optional(request.promo_code.clone()) {
            Some(code) => Some(services.promo_codes.lookup(&code).cloned().ok_or_else(|| {
                ActionError::ValidationFailed("unknown promo code".to_string())
            })?),
            None => None,
        };

        let busy = busy_with_bookings(services, request.date, calendar_busy)?;
        let free = available_slots(request.date, &services.business_hours, &busy, now);
        if !free.contains(&request.time) {
            return Err(ActionError::ValidationFailed(format!(
                "{} {} is not an available slot",
                request.date,
                request.time.format("%H:%M")
            )));
        }

        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            company: normalize_optional(request.company.clone()),
            date: request.date,
            time: request.time,
            duration_minutes: services.business_hours.slot_minutes,
            discount_percent: promo.as_ref().map(|p| p.percent_off).unwrap_or(0),
            promo_code: promo.map(|p| p.code),
            notes: normalize_optional(request.notes.clone()),
            created_at: now,
        };
        services.db.bookings.create(&booking)?;
        tracing::info!(
            "Booked {} {} for {}",
            booking.date,
            booking.time.format("%H:%M"),
            booking.email
        );
        Ok(booking)
    })();
    finish("submit_booking", result)
}

/// Validate and normalize a contact form submission for relay.
pub fn submit_contact(request: &ContactRequest) -> ActionResult<ContactRequest> {
    let result = (|| -> Result<_, ActionError> {
        let name = validate_name("name", &request.name)?;
        let email = validate_email(&request.email)?;
        let message = request.message.trim();
        if message.is_empty() {
            return Err(ActionError::ValidationFailed(
                "message must not be empty".to_string(),
            ));
        }
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(ActionError::ValidationFailed(format!(
                "message must be at most {} characters",
                MAX_MESSAGE_LEN
            )));
        }
        Ok(ContactRequest {
            name,
            email,
            company: normalize_optional(request.company.clone()),
            message: message.to_string(),
        })
    })();
    finish("submit_contact", result)
}
