//! Data models for records, requests, and API payloads.

/// Booking and contact submissions.
pub mod booking;
/// Uploaded file records.
pub mod file;
/// Folder records.
pub mod folder;
/// Quotes and invoices.
pub mod quote;
/// Task board records.
pub mod task;

use serde::{Deserialize, Serialize};

/// Acknowledgement returned by delete actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub id: String,
}

/// Normalize an optional text field from a create request.
///
/// Whitespace-only values become `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
