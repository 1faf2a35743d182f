pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::rate_limit::LoginRateLimiter;
use crate::state::{AppState, SharedState};

pub fn build_app(pool: PgPool, config: Config) -> (Router, SharedState) {
    let max_body_size = config.max_body_size;
    let cors = cors_layer(config.cors_origin.as_deref());

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        login_limiter: LoginRateLimiter::new(),
    });

    let app = Router::new()
        .merge(routes::api_routes(state.clone()))
        .route("/health", axum::routing::get(health))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}

/// Periodic housekeeping: stale limiter entries and expired token rows.
pub fn spawn_maintenance(state: SharedState, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            state.login_limiter.cleanup(Duration::from_secs(15 * 60));
            match db::access_tokens::delete_expired(&state.pool).await {
                Ok(0) => {}
                Ok(n) => tracing::debug!("Removed {n} expired access tokens"),
                Err(e) => tracing::error!("Failed to remove expired access tokens: {e}"),
            }
        }
    })
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(value) => AllowOrigin::exact(value),
        None => AllowOrigin::list(Vec::<HeaderValue>::new()),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}

async fn health() -> &'static str {
    "ok"
}
