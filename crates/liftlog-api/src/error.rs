use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use liftlog_core::{CoreError, FieldErrors};

pub const NOT_FOUND: &str = "Not found.";

/// Every failure a handler can return. Bodies are JSON: a field map for
/// validation errors, `{"detail": ...}` for everything else.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0:?}")]
    Validation(FieldErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => ApiError::Validation(errors),
            CoreError::NotFound => ApiError::NotFound,
            CoreError::Forbidden(detail) => ApiError::Forbidden(detail),
            CoreError::Store(e) => ApiError::Internal(e),
        }
    }
}

/// Only a body that is not a JSON object gets here; mistyped fields inside
/// an object are reported per field by the services.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ApiError::BadRequest(msg) => detail(StatusCode::BAD_REQUEST, &msg),
            ApiError::Unauthorized(msg) => detail(StatusCode::UNAUTHORIZED, &msg),
            ApiError::Forbidden(msg) => detail(StatusCode::FORBIDDEN, &msg),
            ApiError::NotFound => detail(StatusCode::NOT_FOUND, NOT_FOUND),
            ApiError::Internal(e) => {
                error!("Internal error: {:#}", e);
                detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_status_codes() {
        let cases = [
            (
                ApiError::from(CoreError::Validation(FieldErrors::single("title", "bad"))),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::from(CoreError::NotFound), StatusCode::NOT_FOUND),
            (
                ApiError::from(CoreError::Forbidden("no".into())),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::from(CoreError::Store(anyhow::anyhow!("disk on fire"))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
