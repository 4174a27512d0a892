use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub response: String,
}

pub async fn ask(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<AskRequest>, AppError>,
) -> AppResult<Json<AskResponse>> {
    let response = match body.message.as_deref().filter(|m| !m.is_empty()) {
        Some(question) => state.knowledge_base.answer(question).to_string(),
        None => "Please ask a question.".to_string(),
    };

    Ok(Json(AskResponse { response }))
}
