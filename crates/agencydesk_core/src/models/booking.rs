//! Booking widget and contact form submissions (public marketing site).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Confirmed discovery-call booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: u32,
    pub promo_code: Option<String>,
    pub discount_percent: u8,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub promo_code: Option<String>,
    pub notes: Option<String>,
}

/// Free slots for one day, as `HH:MM` start times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub date: NaiveDate,
    pub slot_minutes: u32,
    pub slots: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCheckRequest {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
}
