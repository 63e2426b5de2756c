use crate::db;
use crate::domain::models::{Profile, ProfileInput};
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
        .route("/", get(get_profile).post(upsert_profile))
        .with_state(state)
}

async fn get_profile(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
) -> Result<Json<Data<Option<Profile>>>, ApiError> {
    let profile = db::get_profile(&state.pool, user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to load profile", e))?;
    Ok(data(profile))
}

async fn upsert_profile(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
    Json(payload): Json<ProfileInput>,
) -> Result<Json<Data<Profile>>, ApiError> {
    payload.validate()?;
    let profile = db::upsert_profile(&state.pool, user_id, &payload)
        .await
        .map_err(|e| ApiError::internal("Failed to save profile", e))?;
    Ok(data(profile))
}
