use crate::db;
use crate::domain::models::{MentalEntry, NewMentalEntry, NewPhysicalEntry, PhysicalEntry};
use crate::state::SharedState;
use crate::web::session::UserSession;
use crate::web::{data, ApiError, Data};
use axum::{
    extract::State,
    routing::get,
    Json, Router,
};

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/physical", get(list_physical).post(create_physical))
        .route("/mental", get(list_mental).post(create_mental))
        .with_state(state)
}

async fn list_physical(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
) -> Result<Json<Data<Vec<PhysicalEntry>>>, ApiError> {
    let entries = db::list_physical_entries(&state.pool, user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to load physical entries", e))?;
    Ok(data(entries))
}

async fn create_physical(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
    Json(payload): Json<NewPhysicalEntry>,
) -> Result<Json<Data<PhysicalEntry>>, ApiError> {
    payload.validate()?;
    let created = db::insert_physical_entry(&state.pool, user_id, &payload)
        .await
        .map_err(|e| ApiError::internal("Failed to save physical entry", e))?;
    Ok(data(created))
}

async fn list_mental(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
) -> Result<Json<Data<Vec<MentalEntry>>>, ApiError> {
    let entries = db::list_mental_entries(&state.pool, user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to load mental entries", e))?;
    Ok(data(entries))
}

async fn create_mental(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
    Json(payload): Json<NewMentalEntry>,
) -> Result<Json<Data<MentalEntry>>, ApiError> {
    payload.validate()?;
    let created = db::insert_mental_entry(&state.pool, user_id, &payload)
        .await
        .map_err(|e| ApiError::internal("Failed to save mental entry", e))?;
    Ok(data(created))
}
