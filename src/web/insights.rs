use crate::db;
use crate::domain::models::{
    GoalReading, InsightPayload, MentalReading, PhysicalReading, ProfileReading,
};
use crate::services::insights::InsightError;
use crate::state::SharedState;
use crate::web::session::UserSession;
use crate::web::ApiError;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(insights_for_user).post(insights_for_payload))
        .with_state(state)
}

impl IntoResponse for InsightError {
    fn into_response(self) -> Response {
        match self {
            InsightError::ConfigMissing => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "OPENAI_API_KEY is not set" })),
            )
                .into_response(),
            InsightError::QuotaExceeded { fallback } => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": "quota_exceeded", "fallback": fallback })),
            )
                .into_response(),
            InsightError::Upstream { status, message } => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let message = if message.is_empty() {
                    "Failed to generate insights".to_string()
                } else {
                    message
                };
                (status, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}

// Credential check precedes body parsing.
async fn insights_for_payload(State(state): State<SharedState>, body: Bytes) -> Response {
    if !state.insights.is_configured() {
        return InsightError::ConfigMissing.into_response();
    }

    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("Rejected insight payload: {}", e);
            return ApiError::new(StatusCode::BAD_REQUEST, "Invalid insight payload").into_response();
        }
    };

    match state.insights.request_insights(&payload).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => err.into_response(),
    }
}

/// An empty body or a JSON `null` counts as `{}`.
fn parse_payload(body: &[u8]) -> Result<InsightPayload, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(InsightPayload::default());
    }
    Ok(serde_json::from_slice::<Option<InsightPayload>>(body)?.unwrap_or_default())
}

async fn insights_for_user(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
) -> Result<Response, ApiError> {
    let records = db::load_health_records(&state.pool, user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to load health records", e))?;

    let payload = InsightPayload {
        profile: records.profile.as_ref().map(ProfileReading::from),
        physical: records.physical.iter().map(PhysicalReading::from).collect(),
        mental: records.mental.iter().map(MentalReading::from).collect(),
        goals: records.goals.iter().map(GoalReading::from).collect(),
    };

    Ok(match state.insights.request_insights(&payload).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => err.into_response(),
    })
}
