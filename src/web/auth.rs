use crate::db;
use crate::state::SharedState;
use crate::web::session;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub name: String,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state)
}

async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let email = payload.email.trim().to_lowercase();
    if !email.contains('@') || payload.name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(StatusCode::BAD_REQUEST);
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .to_string();

    let user = db::create_user(&state.pool, &email, payload.name.trim(), &hash)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create user: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::CONFLICT)?;

    tracing::info!("Registered user {}", user.id);
    let headers = session_headers(&state, user.id)?;
    Ok((
        StatusCode::CREATED,
        headers,
        Json(LoginResponse {
            user_id: user.id,
            name: user.name,
        }),
    ))
}

async fn login(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let ip = addr.ip().to_string();
    if !state.login_limiter.check(&ip).await {
        tracing::warn!("Login rate limit exceeded for IP: {}", ip);
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    let user = db::find_user_by_email(&state.pool, payload.email.trim())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let parsed_hash = PasswordHash::new(&user.hash).map_err(|_| StatusCode::UNAUTHORIZED)?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    tracing::info!("User {} logged in", user.id);
    let headers = session_headers(&state, user.id)?;
    Ok((
        headers,
        Json(LoginResponse {
            user_id: user.id,
            name: user.name,
        }),
    ))
}

fn session_headers(state: &SharedState, user_id: Uuid) -> Result<HeaderMap, StatusCode> {
    let token = session::sign_session(user_id, &state.session_key)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        session::session_cookie(&token, state.secure_cookies)?,
    );
    Ok(headers)
}
