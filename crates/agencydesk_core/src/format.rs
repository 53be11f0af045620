//! Display formatting for sizes, dates and money amounts.

use chrono::{DateTime, NaiveDate, Utc};

const SIZE_UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

/// Human-readable byte size with one decimal (`"2.0 MB"`).
///
/// Values under 1 KiB are rendered as whole bytes (`"512 B"`).
pub fn size_label(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0usize;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, SIZE_UNITS[unit])
}

/// Short calendar label for a timestamp (`"Oct 16, 2026"`).
pub fn display_date(at: DateTime<Utc>) -> String {
    date_label(at.date_naive())
}

/// Short calendar label for a date (`"Oct 16, 2026"`).
pub fn date_label(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Format integer cents as a grouped decimal amount (`"1,234.56"`).
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let whole = (abs / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}.{:02}", sign, grouped, abs % 100)
}

/// Reduce an uploaded file name to a storage-safe path segment.
///
/// Keeps ASCII alphanumerics plus `.`, `-` and `_`; everything else becomes `_`.
/// Leading dots are stripped so names can never address parent directories.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    let truncated: String = cleaned.chars().take(128).collect();
    if truncated.is_empty() {
        "file".to_string()
    } else {
        truncated
    }
}
