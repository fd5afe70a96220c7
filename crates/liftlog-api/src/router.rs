use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{comments, exercises, performances, schedules, workouts};

/// All routes. CORS and tracing layers are added by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register/", post(auth::register))
        .route("/auth/token/", post(auth::obtain_token))
        .route("/auth/token/refresh/", post(auth::refresh_token));

    let protected_routes = Router::new()
        .route("/exercises/", get(exercises::list_exercises))
        .route("/exercises/{id}/", get(exercises::get_exercise))
        .route(
            "/workouts/",
            get(workouts::list_workouts).post(workouts::create_workout),
        )
        .route(
            "/workouts/{id}/",
            get(workouts::get_workout)
                .put(workouts::update_workout)
                .delete(workouts::delete_workout),
        )
        .route(
            "/scheduled_workouts/",
            get(schedules::list_schedules).post(schedules::create_schedule),
        )
        .route(
            "/scheduled_workouts/sorted/",
            get(schedules::list_schedules),
        )
        .route(
            "/scheduled_workouts/{id}/",
            get(schedules::get_schedule)
                .put(schedules::update_schedule)
                .delete(schedules::delete_schedule),
        )
        .route(
            "/workout_comments/",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/workout_comments/{id}/",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route(
            "/workout_performances/",
            get(performances::list_performances).post(performances::create_performance),
        )
        .route(
            "/workout_performances/{id}/",
            get(performances::get_performance)
                .put(performances::update_performance)
                .delete(performances::delete_performance),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
