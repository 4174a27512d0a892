use std::path::Path;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod knowledge;
pub mod models;
pub mod rate_limit;
pub mod services;

use config::Config;
use knowledge::KnowledgeBase;
use rate_limit::RateLimiter;
use services::llm::LanguageModel;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimiter,
    /// `None` when no credential was configured; generate calls then fail.
    pub llm: Option<Arc<dyn LanguageModel>>,
    pub knowledge_base: Arc<KnowledgeBase>,
}

pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    // Dashboard and logging endpoints share the per-client limiter
    let limited_routes = Router::new()
        .route("/api/progress", get(handlers::dashboard::progress))
        .route("/api/breathing", post(handlers::breathing::create_session))
        .route(
            "/api/goals",
            get(handlers::goals::list_goals).post(handlers::goals::create_goal),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit,
        ));

    let api_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/chat", post(handlers::knowledge::ask))
        .route("/api/generate", post(handlers::chat::generate))
        .route("/api/feeling", post(handlers::feelings::record_feeling))
        // Journal
        .route(
            "/api/journal",
            get(handlers::journal::list_entries)
                .post(handlers::journal::create_entry)
                .put(handlers::journal::update_entry),
        )
        .route("/api/journal/prompts", get(handlers::journal::list_prompts))
        .route(
            "/api/journal/:id",
            get(handlers::journal::get_entry).delete(handlers::journal::delete_entry),
        )
        // Visualizations
        .route(
            "/api/visualizations/mood-trends",
            get(handlers::dashboard::mood_trends),
        )
        .route(
            "/api/visualizations/wellness-stats",
            get(handlers::dashboard::wellness_stats),
        )
        .merge(limited_routes);

    let page_routes = Router::new()
        .route_service(
            "/",
            ServeFile::new(Path::new(&config.templates_dir).join("index.html")),
        )
        .nest_service("/static", ServeDir::new(&config.static_dir));

    let mut origins: Vec<HeaderValue> = config.frontend_url.parse().into_iter().collect();
    if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
        origins.extend(extra.split(',').filter_map(|o| o.trim().parse().ok()));
    }
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .merge(api_routes)
        .merge(page_routes)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
