use crate::db;
use crate::domain::models::{Goal, GoalUpdate, NewGoal};
use crate::state::SharedState;
use crate::web::session::UserSession;
use crate::web::{data, ApiError, Data};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct DeleteQuery {
    id: Option<Uuid>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route(
            "/",
            get(list_goals)
                .post(create_goal)
                .put(update_goal)
                .delete(delete_goal),
        )
        .with_state(state)
}

async fn list_goals(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
) -> Result<Json<Data<Vec<Goal>>>, ApiError> {
    let goals = db::list_goals(&state.pool, user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to load goals", e))?;
    Ok(data(goals))
}

async fn create_goal(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
    Json(payload): Json<NewGoal>,
) -> Result<Json<Data<Goal>>, ApiError> {
    payload.validate()?;
    let created = db::insert_goal(&state.pool, user_id, &payload)
        .await
        .map_err(|e| ApiError::internal("Failed to save goal", e))?;
    Ok(data(created))
}

async fn update_goal(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
    Json(payload): Json<GoalUpdate>,
) -> Result<Json<Data<Goal>>, ApiError> {
    let mut goal = db::find_goal(&state.pool, user_id, payload.id)
        .await
        .map_err(|e| ApiError::internal("Failed to load goal", e))?
        .ok_or(StatusCode::NOT_FOUND)?;

    payload.apply(&mut goal)?;

    let updated = db::update_goal(&state.pool, &goal)
        .await
        .map_err(|e| ApiError::internal("Failed to update goal", e))?;
    Ok(data(updated))
}

async fn delete_goal(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = query
        .id
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Missing id"))?;

    let deleted = db::delete_goal(&state.pool, user_id, id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete goal", e))?;
    if !deleted {
        return Err(StatusCode::NOT_FOUND.into());
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}
