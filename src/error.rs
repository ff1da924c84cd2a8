use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::backend::{BackendError, BackendErrorKind};
use crate::routes::navigation::Route;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The viewer must sign in first; the response redirects to the login view.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness guard fired, either locally or in the backend.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        if let Error::Unauthorized(msg) = &self {
            let body = Json(json!({ "error": msg, "redirect": Route::Login.path() }));
            return (StatusCode::UNAUTHORIZED, body).into_response();
        }

        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Backend(err) => match err.kind {
                BackendErrorKind::NotFound => {
                    (StatusCode::NOT_FOUND, "Resource not found".to_string())
                }
                BackendErrorKind::UniqueViolation => {
                    (StatusCode::CONFLICT, "Record already exists".to_string())
                }
                BackendErrorKind::Unauthorized => {
                    let body = Json(json!({
                        "error": "Authentication required",
                        "redirect": Route::Login.path(),
                    }));
                    return (StatusCode::UNAUTHORIZED, body).into_response();
                }
                BackendErrorKind::Transport | BackendErrorKind::Decode => {
                    tracing::error!(error = %err, "Backend unavailable");
                    (StatusCode::BAD_GATEWAY, GENERIC_FAILURE.to_string())
                }
                BackendErrorKind::Rejected => {
                    tracing::error!(error = %err, "Backend rejected request");
                    (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string())
                }
            },
            Error::Reqwest(err) => {
                tracing::error!(error = %err, "Outbound HTTP failure");
                (StatusCode::BAD_GATEWAY, GENERIC_FAILURE.to_string())
            }
            Error::Anyhow(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            other => {
                tracing::error!(error = %other, "Unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
