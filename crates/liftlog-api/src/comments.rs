use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use liftlog_core::UserRef;
use liftlog_core::annotations::CommentService;
use liftlog_types::api::{CommentRequest, WorkoutCommentResponse, WorkoutFilter};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, record_id};
use crate::run_blocking;

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    ApiQuery(filter): ApiQuery<WorkoutFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let comments =
        run_blocking(move || Ok(CommentService::new(&state.db).list(&user, filter.workout)?))
            .await?;
    Ok(ApiJson(
        comments
            .iter()
            .map(WorkoutCommentResponse::from)
            .collect::<Vec<_>>(),
    ))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment =
        run_blocking(move || Ok(CommentService::new(&state.db).create(&user, req)?)).await?;
    Ok((
        StatusCode::CREATED,
        ApiJson(WorkoutCommentResponse::from(&comment)),
    ))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = record_id(&id)?;
    let comment = run_blocking(move || Ok(CommentService::new(&state.db).get(&user, id)?)).await?;
    Ok(ApiJson(WorkoutCommentResponse::from(&comment)))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = record_id(&id)?;
    let comment =
        run_blocking(move || Ok(CommentService::new(&state.db).update(&user, id, req)?)).await?;
    Ok(ApiJson(WorkoutCommentResponse::from(&comment)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(user): Extension<UserRef>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = record_id(&id)?;
    run_blocking(move || Ok(CommentService::new(&state.db).delete(&user, id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}
