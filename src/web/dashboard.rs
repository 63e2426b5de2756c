use crate::db;
use crate::domain::trends::{self, GoalProgress, HealthMetric};
use crate::state::SharedState;
use crate::web::session::UserSession;
use crate::web::ApiError;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub metrics: Vec<HealthMetric>,
    pub bmi: Option<f64>,
    pub bmi_category: Option<&'static str>,
    pub goals: Vec<GoalProgress>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(get_dashboard))
        .with_state(state)
}

async fn get_dashboard(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let records = db::load_health_records(&state.pool, user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to load dashboard", e))?;

    let metrics = trends::dashboard_metrics(&records.physical, &records.mental, chrono::Utc::now());
    let bmi = records
        .profile
        .as_ref()
        .and_then(|p| trends::bmi(p.weight, p.height));

    Ok(Json(DashboardResponse {
        metrics,
        bmi,
        bmi_category: bmi.map(trends::bmi_category),
        goals: trends::goals_progress(&records.goals),
    }))
}
