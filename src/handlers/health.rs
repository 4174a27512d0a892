use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "mindful-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Ready when the database answers. The knowledge base and the language model
/// are reported but never block readiness: both degrade to fallback answers.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database_ok = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM journal_prompts")
        .fetch_one(&state.db)
        .await
        .is_ok();

    let language_model = if state.llm.is_some() {
        "configured"
    } else {
        "missing_credential"
    };
    let checks = json!({
        "database": if database_ok { "ok" } else { "failed" },
        "knowledge_base": { "questions": state.knowledge_base.len() },
        "language_model": language_model,
    });

    if database_ok {
        (StatusCode::OK, Json(json!({ "status": "ready", "checks": checks })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready", "checks": checks })),
        )
    }
}
