use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures surfaced at the HTTP boundary.
///
/// Authentication failures (401) and authorization failures (403) are kept
/// apart so clients can choose between refreshing, logging in again, or
/// showing a permission error.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,

    #[error("Access token invalid or expired")]
    InvalidToken,

    #[error("No refresh token")]
    MissingRefreshToken,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("You do not have permission to perform this action.")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid data.")]
    Validation(serde_json::Value),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<imbds_shared::Error> for ApiError {
    fn from(err: imbds_shared::Error) -> Self {
        match err {
            imbds_shared::Error::Validate(errors) => ApiError::Validation(
                serde_json::to_value(errors.field_errors()).unwrap_or_else(|_| json!({})),
            ),
            imbds_shared::Error::User(msg) => ApiError::Validation(json!({ "message": msg })),
            imbds_shared::Error::NotFound(what) => ApiError::NotFound(what),
            imbds_shared::Error::Conflict(msg) => ApiError::Conflict(msg),
            imbds_shared::Error::Forbidden => ApiError::Forbidden,
            imbds_shared::Error::Server(msg) => ApiError::Internal(anyhow::anyhow!(msg)),
            imbds_shared::Error::Unknown(e) => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match self {
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, json!({ "message": message }))
            }
            ApiError::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                json!({ "detail": message, "code": "not_authenticated" }),
            ),
            ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "detail": message, "code": "token_not_valid" }),
            ),
            ApiError::MissingRefreshToken => {
                (StatusCode::UNAUTHORIZED, json!({ "error": message }))
            }
            ApiError::InvalidRefreshToken => (StatusCode::FORBIDDEN, json!({ "detail": message })),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, json!({ "detail": message })),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "details": details }),
            ),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, json!({ "error": message })),
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
