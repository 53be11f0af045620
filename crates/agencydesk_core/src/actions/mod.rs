//! Per-intent action adapters.
//!
//! Each adapter checks the caller's session, validates its input, performs the
//! datastore/storage calls scoped to the caller, and reports the outcome as an
//! [`ActionResult`] instead of returning an error across the boundary.

/// Public booking widget and contact form intents.
pub mod booking;
/// File upload, rename, move and delete.
pub mod file;
/// Folder intents.
pub mod folder;
/// Quote and invoice intents.
pub mod quote;
/// Task board intents.
pub mod task;


use crate::booking::{BusinessHours, PromoCatalog};
use crate::config::Config;
use crate::constants::{DEFAULT_MAX_UPLOAD_SIZE, MAX_NAME_LEN};
use crate::db::Database;
use crate::error::AppError;
use crate::identity::{Identity, SessionProvider};
use crate::storage::{FsObjectStore, ObjectStore, StorageError};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use thiserror::Error;

/// Collaborators shared by every action.
#[derive(Clone)]
pub struct Services {
    pub db: Arc<Database>,
    pub storage: Arc<dyn ObjectStore>,
    pub max_upload_size: usize,
    pub business_hours: BusinessHours,
    pub promo_codes: PromoCatalog,
}

impl Services {
    pub fn new(db: Arc<Database>, storage: Arc<dyn ObjectStore>) -> Self {
        Self {
            db,
            storage,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            business_hours: BusinessHours::default(),
            promo_codes: PromoCatalog::default(),
        }
    }

    /// Open the datastore and object store described by `config`.
    ///
    /// # Returns
    /// Services carrying the configured limits and booking rules.
    ///
    /// # Errors
    /// Returns an error when the database or storage root cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let db = Database::new(&config.db_path)?;
        let storage = FsObjectStore::new(
            &config.storage_path,
            config.public_base_url.clone(),
            config.storage_quota_bytes,
        )
        .map_err(|err| AppError::StorageMessage(err.to_string()))?;
        Ok(Self {
            db: Arc::new(db),
            storage: Arc::new(storage),
            max_upload_size: config.max_upload_size,
            business_hours: config.business_hours,
            promo_codes: config.promo_codes.clone(),
        })
    }
}

/// Failure taxonomy surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("not signed in")]
    Unauthenticated,

    #[error("{0}")]
    ValidationFailed(String),

    /// Collaborator rejection; the message is passed through verbatim.
    #[error("{0}")]
    BackendRejected(String),

    /// A multi-step action failed after an earlier step succeeded.
    #[error("{0}")]
    PartialFailure(String),

    #[error("not found")]
    NotFound,
}

impl From<AppError> for ActionError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound => ActionError::NotFound,
            AppError::BadRequest(msg) => ActionError::ValidationFailed(msg),
            other => ActionError::BackendRejected(other.to_string()),
        }
    }
}

impl From<StorageError> for ActionError {
    fn from(err: StorageError) -> Self {
        ActionError::BackendRejected(err.to_string())
    }
}

/// Outcome of an action: `data` on success, `error` on failure.
///
/// Serializes as `{ "data": ... }` or `{ "error": "message" }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<ActionError>,
}

fn serialize_error<S: Serializer>(
    error: &Option<ActionError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.serialize_str(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

impl<T> ActionResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: ActionError) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Message to show in a feedback banner, if the action failed.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    pub fn into_result(self) -> Result<T, ActionError> {
        match (self.data, self.error) {
            (_, Some(err)) => Err(err),
            (Some(data), None) => Ok(data),
            (None, None) => Err(ActionError::BackendRejected(
                "action returned no data".to_string(),
            )),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ActionResult<U> {
        ActionResult {
            data: self.data.map(f),
            error: self.error,
        }
    }
}

impl<T> From<Result<T, ActionError>> for ActionResult<T> {
    fn from(result: Result<T, ActionError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::err(err),
        }
    }
}

/// Resolve the caller or fail before any collaborator is touched.
pub(crate) fn require_identity(session: &dyn SessionProvider) -> Result<Identity, ActionError> {
    session.current_user().ok_or(ActionError::Unauthenticated)
}

/// Trim and bound a required short text field.
pub(crate) fn validate_name(field: &str, value: &str) -> Result<String, ActionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ActionError::ValidationFailed(format!(
            "{} must not be empty",
            field
        )));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ActionError::ValidationFailed(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_email(value: &str) -> Result<String, ActionError> {
    let trimmed = value.trim();
    let valid = trimmed
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.ends_with('.'))
        .unwrap_or(false);
    if !valid || trimmed.chars().any(char::is_whitespace) {
        return Err(ActionError::ValidationFailed(format!(
            "'{}' is not a valid email address",
            trimmed
        )));
    }
    Ok(trimmed.to_string())
}

/// Load an owner-scoped row, treating another owner's row as missing.
pub(crate) fn owned<T>(
    row: Option<T>,
    identity: &Identity,
    owner_of: impl Fn(&T) -> &str,
) -> Result<T, ActionError> {
    match row {
        Some(row) if owner_of(&row) == identity.user_id => Ok(row),
        _ => Err(ActionError::NotFound),
    }
}

/// Log the outcome of `intent` and wrap it for the caller.
pub(crate) fn finish<T>(intent: &str, result: Result<T, ActionError>) -> ActionResult<T> {
    match &result {
        Ok(_) => tracing::debug!(intent, "action succeeded"),
        Err(err @ (ActionError::BackendRejected(_) | ActionError::PartialFailure(_))) => {
            tracing::warn!(intent, error = %err, "action failed")
        }
        Err(err) => tracing::debug!(intent, error = %err, "action rejected"),
    }
    result.into()
}
