use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use liftlog_core::UserRef;
use liftlog_core::annotations::PerformanceService;
use liftlog_types::api::{PerformanceRequest, WorkoutPerformanceResponse, WorkoutFilter};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, record_id};
use crate::run_blocking;

pub async fn list_performances(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    ApiQuery(filter): ApiQuery<WorkoutFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let performances = run_blocking(move || {
        Ok(PerformanceService::new(&state.db).list(&user, filter.workout)?)
    })
    .await?;
    Ok(ApiJson(
        performances
            .iter()
            .map(WorkoutPerformanceResponse::from)
            .collect::<Vec<_>>(),
    ))
}

pub async fn create_performance(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    ApiJson(req): ApiJson<PerformanceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let performance =
        run_blocking(move || Ok(PerformanceService::new(&state.db).create(&user, req)?)).await?;
    Ok((
        StatusCode::CREATED,
        ApiJson(WorkoutPerformanceResponse::from(&performance)),
    ))
}

pub async fn get_performance(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = record_id(&id)?;
    let performance =
        run_blocking(move || Ok(PerformanceService::new(&state.db).get(&user, id)?)).await?;
    Ok(ApiJson(WorkoutPerformanceResponse::from(&performance)))
}

pub async fn update_performance(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<PerformanceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = record_id(&id)?;
    let performance = run_blocking(move || {
        Ok(PerformanceService::new(&state.db).update(&user, id, req)?)
    })
    .await?;
    Ok(ApiJson(WorkoutPerformanceResponse::from(&performance)))
}

pub async fn delete_performance(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = record_id(&id)?;
    run_blocking(move || Ok(PerformanceService::new(&state.db).delete(&user, id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}
