use crate::db;
use crate::domain::export;
use crate::state::SharedState;
use crate::web::session::UserSession;
use crate::web::ApiError;
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/physical.csv", get(physical_csv))
        .route("/mental.csv", get(mental_csv))
        .with_state(state)
}

fn csv_response(filename: &'static str, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}

async fn physical_csv(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = db::list_physical_entries(&state.pool, user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to export physical entries", e))?;
    Ok(csv_response("physical-data.csv", export::physical_csv(&entries)))
}

async fn mental_csv(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = db::list_mental_entries(&state.pool, user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to export mental entries", e))?;
    Ok(csv_response("mental-data.csv", export::mental_csv(&entries)))
}
