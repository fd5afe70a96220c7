use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use liftlog_core::UserRef;
use liftlog_core::workouts::WorkoutService;
use liftlog_types::api::{CreateWorkoutRequest, UpdateWorkoutRequest, WorkoutPlanResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{ApiJson, record_id};
use crate::run_blocking;

pub async fn list_workouts(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
) -> Result<impl IntoResponse, ApiError> {
    let plans = run_blocking(move || Ok(WorkoutService::new(&state.db).list(&user)?)).await?;
    Ok(ApiJson(
        plans.iter().map(WorkoutPlanResponse::from).collect::<Vec<_>>(),
    ))
}

pub async fn create_workout(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    ApiJson(req): ApiJson<CreateWorkoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let plan =
        run_blocking(move || Ok(WorkoutService::new(&state.db).create(&user, req)?)).await?;
    Ok((StatusCode::CREATED, ApiJson(WorkoutPlanResponse::from(&plan))))
}

pub async fn get_workout(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = record_id(&id)?;
    let plan = run_blocking(move || Ok(WorkoutService::new(&state.db).get(&user, id)?)).await?;
    Ok(ApiJson(WorkoutPlanResponse::from(&plan)))
}

/// Scalar fields present in the body are replaced; a present `exercises`
/// list replaces every line of the plan.
pub async fn update_workout(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateWorkoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = record_id(&id)?;
    let plan = run_blocking(move || Ok(WorkoutService::new(&state.db).replace(&user, id, req)?))
        .await?;
    Ok(ApiJson(WorkoutPlanResponse::from(&plan)))
}

pub async fn delete_workout(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = record_id(&id)?;
    run_blocking(move || Ok(WorkoutService::new(&state.db).delete(&user, id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}
