use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::warn;

use liftlog_core::UserRef;
use liftlog_types::api::TokenType;

use crate::auth::{AppState, INVALID_TOKEN};
use crate::error::ApiError;

pub const NO_CREDENTIALS: &str = "Authentication credentials were not provided.";

/// Validate the bearer access token and attach the caller as a [`UserRef`]
/// request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(Authorization(bearer)) = req.headers().typed_get::<Authorization<Bearer>>() else {
        return Err(ApiError::Unauthorized(NO_CREDENTIALS.into()));
    };

    let claims = state
        .tokens
        .verify(bearer.token(), TokenType::Access)
        .map_err(|e| {
            warn!("Rejected bearer token on {}: {}", req.uri().path(), e);
            ApiError::Unauthorized(INVALID_TOKEN.into())
        })?;

    req.extensions_mut().insert(UserRef {
        id: claims.sub,
        username: claims.username,
    });
    Ok(next.run(req).await)
}
