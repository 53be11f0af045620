//! HTTP error mapping for API handlers.

use crate::integrations::IntegrationError;
use agencydesk_core::ActionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error returned by handlers; renders as `{ "error": message }`.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Integration(#[from] IntegrationError),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::Action(ActionError::Unauthenticated) => StatusCode::UNAUTHORIZED,
            HttpError::Action(ActionError::ValidationFailed(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            HttpError::Action(ActionError::NotFound) => StatusCode::NOT_FOUND,
            HttpError::Action(ActionError::BackendRejected(_)) => StatusCode::BAD_GATEWAY,
            HttpError::Action(ActionError::PartialFailure(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::Integration(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", status, self);
        }
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_errors_map_to_distinct_statuses() {
        let cases = [
            (ActionError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (
                ActionError::ValidationFailed("title must not be empty".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ActionError::NotFound, StatusCode::NOT_FOUND),
            (
                ActionError::BackendRejected("quota exceeded".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ActionError::PartialFailure("upload stored but not recorded".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(HttpError::from(err).status(), expected);
        }
    }

    #[test]
    fn message_is_passed_through() {
        let err = HttpError::from(ActionError::BackendRejected("quota exceeded".to_string()));
        assert_eq!(err.to_string(), "quota exceeded");
    }
}
