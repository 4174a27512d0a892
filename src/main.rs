use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use mindful_api::config::Config;
use mindful_api::knowledge::KnowledgeBase;
use mindful_api::rate_limit::{self, RateLimiter};
use mindful_api::services::gemini::GeminiClient;
use mindful_api::services::llm::LanguageModel;
use mindful_api::{build_router, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mindful_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    // Database
    let db = db::create_pool(&config.database_url)
        .await
        .context("Failed to open database")?;
    db::run_migrations(&db)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations applied");

    let llm: Option<Arc<dyn LanguageModel>> = match GeminiClient::from_config(&config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::warn!(error = %e, "Language model unavailable, /api/generate will fail");
            None
        }
    };

    let knowledge_base = Arc::new(KnowledgeBase::load(&config.knowledge_base_path));

    let rate_limiter = RateLimiter::new(
        config.rate_limit_max,
        Duration::from_secs(config.rate_limit_window_secs.max(1)),
    );
    rate_limit::spawn_prune_worker(rate_limiter.clone());

    let state = AppState {
        db,
        config: config.clone(),
        rate_limiter,
        llm,
        knowledge_base,
    };

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    // Client IPs key the rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
