use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::{
    dto::{CreateWorkoutRequest, UpdateWorkoutRequest},
    repo_types::Workout,
};
use crate::{
    dto::MessageResponse,
    error::ApiError,
    extractors::{required_id, JsonBody},
    state::AppState,
};

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", post(create_workout).get(get_workouts_by_user_id))
        .route(
            "/workout",
            get(get_workout_by_user_id)
                .put(update_workout)
                .delete(delete_workout),
        )
}

/// Workout id and owner id, both required query parameters.
fn scoped_ids(params: &HashMap<String, String>) -> Result<(i32, i32), ApiError> {
    Ok((required_id(params, "id")?, required_id(params, "user_id")?))
}

fn required_name(name: &str) -> Result<&str, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    Ok(name)
}

#[instrument(skip(state, payload))]
pub async fn create_workout(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateWorkoutRequest>,
) -> Result<Json<Workout>, ApiError> {
    let name = required_name(&payload.name)?;

    let workout = state
        .repo
        .create_workout(payload.user_id, name, payload.description.as_deref())
        .await
        .map_err(|e| {
            error!(error = %e, user_id = payload.user_id, "create workout failed");
            ApiError::internal("failed to create workout")
        })?;

    info!(workout_id = workout.id, user_id = workout.user_id, "workout created");
    Ok(Json(workout))
}

#[instrument(skip(state))]
pub async fn get_workouts_by_user_id(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Workout>>, ApiError> {
    let user_id = required_id(&params, "id")?;

    let workouts = state.repo.get_workouts_by_user(user_id).await.map_err(|e| {
        error!(error = %e, user_id, "list workouts failed");
        ApiError::internal("failed to get workouts")
    })?;
    Ok(Json(workouts))
}

#[instrument(skip(state))]
pub async fn get_workout_by_user_id(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Workout>, ApiError> {
    let (id, user_id) = scoped_ids(&params)?;

    match state.repo.get_workout(id, user_id).await {
        Ok(Some(w)) => Ok(Json(w)),
        Ok(None) => {
            warn!(workout_id = id, user_id, "workout not found");
            Err(ApiError::not_found("workout not found"))
        }
        Err(e) => {
            error!(error = %e, workout_id = id, user_id, "get workout failed");
            Err(ApiError::internal("failed to get workout"))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn update_workout(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    JsonBody(payload): JsonBody<UpdateWorkoutRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (id, user_id) = scoped_ids(&params)?;
    let name = required_name(&payload.name)?;

    let updated = state
        .repo
        .update_workout(id, user_id, name, payload.description.as_deref(), payload.date)
        .await
        .map_err(|e| {
            error!(error = %e, workout_id = id, user_id, "update workout failed");
            ApiError::internal("failed to update workout")
        })?;
    if !updated {
        warn!(workout_id = id, user_id, "update of unknown workout");
        return Err(ApiError::not_found("workout not found"));
    }

    info!(workout_id = id, user_id, "workout updated");
    Ok(Json(MessageResponse::new("success update workout")))
}

#[instrument(skip(state))]
pub async fn delete_workout(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (id, user_id) = scoped_ids(&params)?;

    let deleted = state.repo.delete_workout(id, user_id).await.map_err(|e| {
        error!(error = %e, workout_id = id, user_id, "delete workout failed");
        ApiError::internal("failed to delete workout")
    })?;
    if !deleted {
        warn!(workout_id = id, user_id, "delete of unknown workout");
        return Err(ApiError::not_found("workout not found"));
    }

    info!(workout_id = id, user_id, "workout deleted");
    Ok(Json(MessageResponse::new("success deleted workout")))
}
