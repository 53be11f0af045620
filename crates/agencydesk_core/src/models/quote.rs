//! Quotes and invoices.

use super::normalize_optional;
use crate::format::date_label;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuoteKind {
    Quote,
    Invoice,
}

impl QuoteKind {
    /// Prefix of the human-facing document number.
    pub fn number_prefix(self) -> &'static str {
        match self {
            QuoteKind::Quote => "Q",
            QuoteKind::Invoice => "INV",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Declined,
    Paid,
}

impl QuoteStatus {
    /// Whether a document of `kind` may carry this status.
    ///
    /// Quotes are accepted or declined; invoices are paid.
    pub fn allowed_for(self, kind: QuoteKind) -> bool {
        match self {
            QuoteStatus::Draft | QuoteStatus::Sent => true,
            QuoteStatus::Accepted | QuoteStatus::Declined => kind == QuoteKind::Quote,
            QuoteStatus::Paid => kind == QuoteKind::Invoice,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl LineItem {
    pub fn amount_cents(&self) -> i64 {
        self.unit_price_cents.saturating_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub owner_id: String,
    pub kind: QuoteKind,
    pub number: String,
    pub client_name: String,
    pub client_email: String,
    pub status: QuoteStatus,
    pub line_items: Vec<LineItem>,
    /// Tax rate in basis points (`825` = 8.25%).
    pub tax_rate_bps: u32,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub source_quote_id: Option<String>,
    pub notes: Option<String>,
    pub issued_label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a quote or invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuoteRequest {
    pub kind: Option<QuoteKind>,
    pub client_name: String,
    pub client_email: String,
    pub line_items: Vec<LineItem>,
    pub tax_rate_bps: Option<u32>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Partial quote update. `notes` uses an empty string to clear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotePatch {
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub status: Option<QuoteStatus>,
    pub line_items: Option<Vec<LineItem>>,
    pub tax_rate_bps: Option<u32>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl QuotePatch {
    pub fn status(status: QuoteStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, quote: &mut Quote, now: DateTime<Utc>) {
        if let Some(name) = &self.client_name {
            quote.client_name = name.trim().to_string();
        }
        if let Some(email) = &self.client_email {
            quote.client_email = email.trim().to_string();
        }
        if let Some(status) = self.status {
            quote.status = status;
        }
        if let Some(items) = &self.line_items {
            quote.line_items = items.clone();
        }
        if let Some(rate) = self.tax_rate_bps {
            quote.tax_rate_bps = rate;
        }
        if let Some(due) = self.due_date {
            quote.due_date = Some(due);
        }
        if let Some(notes) = &self.notes {
            quote.notes = normalize_optional(Some(notes.clone()));
        }
        quote.updated_at = now;
    }
}

impl Quote {
    /// Build an unnumbered document from a create request.
    ///
    /// The datastore assigns `number` when the row is inserted.
    pub fn from_request(owner_id: &str, request: &CreateQuoteRequest, now: DateTime<Utc>) -> Self {
        let issue_date = request.issue_date.unwrap_or_else(|| now.date_naive());
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            kind: request.kind.unwrap_or(QuoteKind::Quote),
            number: String::new(),
            client_name: request.client_name.trim().to_string(),
            client_email: request.client_email.trim().to_string(),
            status: QuoteStatus::Draft,
            line_items: request.line_items.clone(),
            tax_rate_bps: request.tax_rate_bps.unwrap_or(0),
            issue_date,
            due_date: request.due_date,
            source_quote_id: None,
            notes: normalize_optional(request.notes.clone()),
            issued_label: date_label(issue_date),
            created_at: now,
            updated_at: now,
        }
    }

    /// Unsaved document used as an optimistic placeholder.
    pub fn draft(request: &CreateQuoteRequest) -> Self {
        let mut quote = Self::from_request("", request, Utc::now());
        quote.id = String::new();
        quote
    }

    /// Subtotal, tax (rounded half up to the cent) and total.
    pub fn totals(&self) -> QuoteTotals {
        let subtotal_cents: i64 = self
            .line_items
            .iter()
            .map(LineItem::amount_cents)
            .fold(0i64, i64::saturating_add);
        let tax_cents = if subtotal_cents <= 0 {
            0
        } else {
            let scaled = i128::from(subtotal_cents) * i128::from(self.tax_rate_bps);
            ((scaled + 5_000) / 10_000) as i64
        };
        QuoteTotals {
            subtotal_cents,
            tax_cents,
            total_cents: subtotal_cents.saturating_add(tax_cents),
        }
    }
}

/// Format a sequence number as a document number (`Q-0007`).
pub fn document_number(kind: QuoteKind, sequence: u32) -> String {
    format!("{}-{:04}", kind.number_prefix(), sequence)
}

/// Parse the sequence back out of a document number of `kind`.
pub fn parse_document_number(kind: QuoteKind, number: &str) -> Option<u32> {
    number
        .strip_prefix(kind.number_prefix())
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(|digits| digits.parse().ok())
}
