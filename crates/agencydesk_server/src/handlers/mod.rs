//! HTTP request handlers.
//!
//! Every handler answers with the action envelope: `{ "data": ... }` on
//! success and `{ "error": "..." }` with a mapped status on failure.

/// Public booking widget and contact form endpoints.
pub mod booking;
/// File endpoints.
pub mod file;
/// Folder endpoints.
pub mod folder;
/// Quote and invoice endpoints.
pub mod quote;
/// Task board endpoints.
pub mod task;

use crate::error::HttpError;
use agencydesk_core::ActionResult;
use axum::Json;
use serde_json::{json, Value};

pub(crate) type ApiResult<T> = Result<Json<ActionResult<T>>, HttpError>;

/// Turn an action outcome into a response, mapping failures to a status.
pub(crate) fn respond<T>(mut result: ActionResult<T>) -> ApiResult<T> {
    if let Some(err) = result.error.take() {
        return Err(err.into());
    }
    Ok(Json(result))
}

/// Liveness check.
pub async fn health() -> Json<Value> {
    Json(json!({ "data": { "status": "ok" } }))
}
