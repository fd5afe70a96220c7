use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use liftlog_core::UserRef;
use liftlog_core::schedules::ScheduleService;
use liftlog_types::api::{ScheduleQuery, ScheduleRequest, ScheduledWorkoutResponse};
use liftlog_types::models::SortOrder;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, record_id};
use crate::run_blocking;

/// Serves both `/scheduled_workouts/` and `/scheduled_workouts/sorted/`.
pub async fn list_schedules(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    ApiQuery(query): ApiQuery<ScheduleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let order = SortOrder::from_param(query.order.as_deref());
    let schedules =
        run_blocking(move || Ok(ScheduleService::new(&state.db).list(&user, order)?)).await?;
    Ok(ApiJson(
        schedules
            .iter()
            .map(ScheduledWorkoutResponse::from)
            .collect::<Vec<_>>(),
    ))
}

pub async fn create_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    ApiJson(req): ApiJson<ScheduleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let schedule =
        run_blocking(move || Ok(ScheduleService::new(&state.db).create(&user, req)?)).await?;
    Ok((
        StatusCode::CREATED,
        ApiJson(ScheduledWorkoutResponse::from(&schedule)),
    ))
}

pub async fn get_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = record_id(&id)?;
    let schedule =
        run_blocking(move || Ok(ScheduleService::new(&state.db).get(&user, id)?)).await?;
    Ok(ApiJson(ScheduledWorkoutResponse::from(&schedule)))
}

pub async fn update_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ScheduleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = record_id(&id)?;
    let schedule =
        run_blocking(move || Ok(ScheduleService::new(&state.db).update(&user, id, req)?)).await?;
    Ok(ApiJson(ScheduledWorkoutResponse::from(&schedule)))
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = record_id(&id)?;
    run_blocking(move || Ok(ScheduleService::new(&state.db).delete(&user, id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}
