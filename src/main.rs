mod config;
mod db;
mod domain;
mod middleware;
mod services;
mod state;
mod web;

use crate::config::AppConfig;
use crate::db::seed;
use crate::middleware::RateLimiter;
use crate::services::ai::OpenAiBackend;
use crate::services::insights::{InsightService, InsightSettings};
use crate::state::SharedState;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LOGIN_ATTEMPTS: usize = 5;
const LOGIN_WINDOW: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to run database migrations: {}", e);
            e
        })?;
    tracing::info!("Database migrations completed");

    if config.seed_demo {
        seed::seed_demo(&pool).await?;
    }

    if config.openai.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set, insight requests will fail");
    }
    let backend = Arc::new(OpenAiBackend::new(&config.openai)?);
    let insights = Arc::new(InsightService::new(
        backend,
        InsightSettings::from(&config.openai),
    ));

    let shared: SharedState = Arc::new(state::AppState {
        pool,
        insights,
        session_key: config.session_key.clone(),
        secure_cookies: config.secure_cookies,
        login_limiter: RateLimiter::new(LOGIN_ATTEMPTS, LOGIN_WINDOW),
    });

    // Forget idle login windows so the limiter map stays bounded.
    let limiter = shared.login_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            limiter.prune().await;
        }
    });

    let app = Router::new()
        .merge(web::routes(shared))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
