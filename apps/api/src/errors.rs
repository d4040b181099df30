use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure reaching a remote collaborator or decoding its reply.
/// Shared by the marketplace, backend and bid proxy clients.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Request error: {0}")]
    Transport(#[from] TransportError),

    /// The marketplace rejected the token. The stored credential is already
    /// dropped by the time this reaches a handler response.
    #[error("Authentication failed")]
    AuthFailure,

    #[error("Marketplace account is not linked")]
    NotLinked,

    #[error("No valid token found")]
    NoValidToken,

    #[error("Query error: {0}")]
    Query(String),

    #[error("Display error: {0}")]
    Display(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Superseded by a newer request")]
    Superseded,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Transport(e) => {
                tracing::error!("Transport error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "TRANSPORT_ERROR",
                    "A remote service could not be reached".to_string(),
                )
            }
            AppError::AuthFailure => (
                StatusCode::UNAUTHORIZED,
                "RELINK_REQUIRED",
                "Your token is invalid. Please re-link your Upwork account.".to_string(),
            ),
            AppError::NotLinked => (
                StatusCode::UNAUTHORIZED,
                "NOT_LINKED",
                "Upwork credentials not found. Please link your Upwork account first.".to_string(),
            ),
            AppError::NoValidToken => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_VALID_TOKEN",
                "No valid token found. Please log in to Upwork in a separate tab and try again."
                    .to_string(),
            ),
            AppError::Query(msg) => (StatusCode::BAD_GATEWAY, "QUERY_ERROR", msg.clone()),
            AppError::Display(msg) => (StatusCode::BAD_GATEWAY, "DISPLAY_ERROR", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Superseded => (
                StatusCode::CONFLICT,
                "SUPERSEDED",
                "A newer request replaced this one".to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
