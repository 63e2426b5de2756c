pub mod auth;
pub mod dashboard;
pub mod entries;
pub mod export;
pub mod goals;
pub mod insights;
pub mod profile;
pub mod session;

use crate::domain::models::ValidationError;
use crate::state::SharedState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

async fn health() -> &'static str {
    "OK"
}

pub fn routes(state: SharedState) -> Router {
    let api = Router::new()
        .nest("/profile", profile::router(state.clone()))
        .merge(entries::router(state.clone()))
        .nest("/goals", goals::router(state.clone()))
        .nest("/dashboard", dashboard::router(state.clone()))
        .nest("/export", export::router(state.clone()))
        .nest("/insights", insights::router(state.clone()));

    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::router(state))
        .nest("/api", api)
}

/// `{data: ...}` envelope used by the record endpoints.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

pub fn data<T>(data: T) -> Json<Data<T>> {
    Json(Data { data })
}

/// Status plus an `{error}` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        tracing::error!("{}: {}", context, err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, context)
    }
}

impl From<StatusCode> for ApiError {
    fn from(status: StatusCode) -> Self {
        let message = status.canonical_reason().unwrap_or("Request failed");
        Self::new(status, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
