//! Shared constants used across AgencyDesk crates.

/// Default API port for the AgencyDesk server.
pub const DEFAULT_PORT: u16 = 38511;

/// Default maximum upload size accepted by the file actions.
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 25 * 1024 * 1024;

/// Default public base URL used to build object links.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:38511/objects";

/// Default base URL for CLI/API clients.
pub const DEFAULT_CLI_SERVER_URL: &str = "http://localhost:38511";

/// Header carrying the authenticated user id set by the fronting auth proxy.
pub const USER_HEADER: &str = "x-agencydesk-user";
/// Header carrying the authenticated user's email.
pub const EMAIL_HEADER: &str = "x-agencydesk-email";

/// Upper bound for short text fields (names, titles).
pub const MAX_NAME_LEN: usize = 200;

/// Default payment window for invoices converted from quotes.
pub const INVOICE_DUE_DAYS: i64 = 30;
