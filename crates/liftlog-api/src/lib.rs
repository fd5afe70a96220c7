//! HTTP surface for liftlog: axum handlers, bearer-token middleware and the
//! router that ties them to the SQLite-backed services.

pub mod auth;
pub mod comments;
pub mod error;
pub mod exercises;
pub mod extract;
pub mod middleware;
pub mod performances;
pub mod router;
pub mod schedules;
pub mod workouts;

pub use auth::{AppState, AppStateInner, TokenIssuer};
pub use error::ApiError;
pub use router::router;

use tracing::error;

/// Run blocking store work off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
    })?
}
