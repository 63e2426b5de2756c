use crate::middleware::RateLimiter;
use crate::services::insights::InsightService;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub insights: Arc<InsightService>,
    pub session_key: Vec<u8>,
    pub secure_cookies: bool,
    pub login_limiter: RateLimiter,
}

pub type SharedState = Arc<AppState>;
