//! Configuration loading from environment variables.

use crate::booking::{BusinessHours, PromoCatalog};
use crate::constants::{DEFAULT_MAX_UPLOAD_SIZE, DEFAULT_PORT, DEFAULT_PUBLIC_BASE_URL};
use std::env;
use std::path::PathBuf;

/// Runtime configuration for AgencyDesk.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub storage_path: String,
    pub public_base_url: String,
    pub port: u16,
    pub max_upload_size: usize,
    pub storage_quota_bytes: Option<u64>,
    pub calendar_webhook_url: Option<String>,
    pub email_webhook_url: Option<String>,
    pub promo_codes: PromoCatalog,
    pub business_hours: BusinessHours,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE (standard)
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

fn default_cache_path(leaf: &str) -> String {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache")
        .join("agencydesk")
        .join(leaf)
        .to_string_lossy()
        .to_string()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        let business_hours = match env_non_empty("BUSINESS_HOURS") {
            Some(raw) => BusinessHours::parse(&raw).unwrap_or_else(|err| {
                tracing::warn!("Ignoring BUSINESS_HOURS='{}': {}", raw, err);
                BusinessHours::default()
            }),
            None => BusinessHours::default(),
        };

        Self {
            db_path: env::var("DB_PATH")
                .map(expand_tilde)
                .unwrap_or_else(|_| default_cache_path("db")),
            storage_path: env::var("STORAGE_PATH")
                .map(expand_tilde)
                .unwrap_or_else(|_| default_cache_path("objects")),
            public_base_url: env_non_empty("PUBLIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE),
            storage_quota_bytes: env::var("STORAGE_QUOTA_BYTES")
                .ok()
                .and_then(|s| s.trim().parse().ok()),
            calendar_webhook_url: env_non_empty("CALENDAR_WEBHOOK_URL"),
            email_webhook_url: env_non_empty("EMAIL_WEBHOOK_URL"),
            promo_codes: env_non_empty("PROMO_CODES")
                .map(|raw| PromoCatalog::parse_lenient(&raw))
                .unwrap_or_default(),
            business_hours,
        }
    }
}
