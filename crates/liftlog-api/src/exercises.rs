use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

use liftlog_core::ports::ExerciseCatalog;
use liftlog_types::api::ExerciseResponse;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{ApiJson, record_id};
use crate::run_blocking;

pub async fn list_exercises(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let exercises = run_blocking(move || Ok(state.db.list_exercises()?)).await?;
    Ok(ApiJson(
        exercises.iter().map(ExerciseResponse::from).collect::<Vec<_>>(),
    ))
}

pub async fn get_exercise(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = record_id(&id)?;
    let exercise = run_blocking(move || Ok(state.db.resolve_exercise(id)?))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ApiJson(ExerciseResponse::from(&exercise)))
}
