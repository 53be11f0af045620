//! Booking widget rules: business hours, free slots and promo codes.

use crate::error::AppError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Bookable window for discovery calls. Times are interpreted in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub slot_minutes: u32,
    pub weekdays_only: bool,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            slot_minutes: 30,
            weekdays_only: true,
        }
    }
}

impl BusinessHours {
    /// Parse `HH:MM-HH:MM`, optionally followed by `/<slot minutes>`.
    ///
    /// # Returns
    /// Weekday-only hours with the given window.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] for malformed or empty windows.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();
        let (window, slot) = match raw.split_once('/') {
            Some((window, slot)) => {
                let minutes: u32 = slot.trim().parse().map_err(|_| {
                    AppError::BadRequest(format!("invalid slot length '{}'", slot.trim()))
                })?;
                (window, minutes)
            }
            None => (raw, Self::default().slot_minutes),
        };
        let (open, close) = window
            .split_once('-')
            .ok_or_else(|| AppError::BadRequest(format!("expected HH:MM-HH:MM, got '{}'", raw)))?;
        let open = parse_clock(open)?;
        let close = parse_clock(close)?;
        if close <= open {
            return Err(AppError::BadRequest(
                "closing time must be after opening time".to_string(),
            ));
        }
        if slot == 0 || i64::from(slot) > (close - open).num_minutes() {
            return Err(AppError::BadRequest(format!(
                "slot length {} does not fit the window",
                slot
            )));
        }
        Ok(Self {
            open,
            close,
            slot_minutes: slot,
            weekdays_only: true,
        })
    }

    /// Whether bookings are taken at all on `date`.
    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        !self.weekdays_only || !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Every slot start inside the window, ignoring busy time.
    pub fn slot_starts(&self, date: NaiveDate) -> Vec<NaiveTime> {
        if !self.is_open_on(date) || self.slot_minutes == 0 {
            return Vec::new();
        }
        let step = Duration::minutes(i64::from(self.slot_minutes));
        let close = date.and_time(self.close);
        let mut cursor = date.and_time(self.open);
        let mut starts = Vec::new();
        while cursor + step <= close {
            starts.push(cursor.time());
            cursor += step;
        }
        starts
    }
}

fn parse_clock(raw: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| AppError::BadRequest(format!("invalid time '{}'", raw.trim())))
}

/// Interval already taken on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusySlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusySlot {
    fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }
}

/// Free slot starts on `date`.
///
/// A slot is free when it starts after `now`, ends by closing time, and does
/// not overlap any entry in `busy`.
pub fn available_slots(
    date: NaiveDate,
    hours: &BusinessHours,
    busy: &[BusySlot],
    now: DateTime<Utc>,
) -> Vec<NaiveTime> {
    let step = Duration::minutes(i64::from(hours.slot_minutes));
    hours
        .slot_starts(date)
        .into_iter()
        .filter(|time| {
            let start = date.and_time(*time).and_utc();
            let end = start + step;
            start > now && !busy.iter().any(|slot| slot.overlaps(start, end))
        })
        .collect()
}

/// Discount code accepted by the booking widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCode {
    pub code: String,
    pub percent_off: u8,
}

/// Known promo codes, matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromoCatalog {
    codes: Vec<PromoCode>,
}

impl PromoCatalog {
    /// Parse a `CODE:PERCENT` comma list.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] on the first malformed entry.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let mut catalog = Self::default();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            catalog.insert(parse_promo_entry(entry)?);
        }
        Ok(catalog)
    }

    /// Parse a `CODE:PERCENT` comma list, skipping malformed entries.
    pub fn parse_lenient(raw: &str) -> Self {
        let mut catalog = Self::default();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match parse_promo_entry(entry) {
                Ok(code) => catalog.insert(code),
                Err(err) => tracing::warn!("Skipping promo code entry '{}': {}", entry, err),
            }
        }
        catalog
    }

    fn insert(&mut self, code: PromoCode) {
        match self
            .codes
            .iter_mut()
            .find(|existing| existing.code.eq_ignore_ascii_case(&code.code))
        {
            Some(existing) => *existing = code,
            None => self.codes.push(code),
        }
    }

    pub fn lookup(&self, code: &str) -> Option<&PromoCode> {
        let code = code.trim();
        self.codes
            .iter()
            .find(|known| known.code.eq_ignore_ascii_case(code))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

fn parse_promo_entry(entry: &str) -> Result<PromoCode, AppError> {
    let (code, percent) = entry
        .split_once(':')
        .ok_or_else(|| AppError::BadRequest("expected CODE:PERCENT".to_string()))?;
    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::BadRequest("promo code is empty".to_string()));
    }
    let percent_off: u8 = percent
        .trim()
        .parse()
        .ok()
        .filter(|p| (1..=100).contains(p))
        .ok_or_else(|| AppError::BadRequest("percent must be between 1 and 100".to_string()))?;
    Ok(PromoCode {
        code: code.to_ascii_uppercase(),
        percent_off,
    })
}
