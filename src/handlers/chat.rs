use std::convert::Infallible;

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use futures_util::{future, Stream, StreamExt};
use serde_json::json;

use crate::dto::StatusResponse;
use crate::error::{AppError, AppResult};
use crate::models::chat::{prompt_text, GenerateRequest};
use crate::services::llm::{ModelError, TextStream};
use crate::AppState;

/// POST /api/generate
///
/// Single-shot requests persist the exchange as a `ChatInteraction` before
/// answering. Streaming requests relay chunks as `data: {"text": ...}` events
/// and are not persisted.
pub async fn generate(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<GenerateRequest>, AppError>,
) -> AppResult<Response> {
    let prompt = body
        .contents
        .as_ref()
        .and_then(prompt_text)
        .ok_or_else(|| AppError::Validation("Message content is required".into()))?;

    let llm = state
        .llm
        .clone()
        .ok_or(AppError::Upstream(ModelError::MissingCredential))?;

    if body.stream {
        let chunks = llm.stream(&prompt, body.model.as_deref()).await?;
        tracing::debug!(prompt_chars = prompt.len(), "Streaming language model response");
        return Ok(event_stream(chunks).into_response());
    }

    let reply = llm.generate(&prompt, body.model.as_deref()).await?;

    let mut tx = state.db.begin().await?;
    sqlx::query(
        "INSERT INTO chat_interactions (user_message, bot_response, timestamp) VALUES (?, ?, ?)",
    )
    .bind(&prompt)
    .bind(&reply)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(Json(StatusResponse::success(reply)).into_response())
}

/// One event per chunk. The first upstream failure becomes a final
/// `{"error": ...}` event and nothing after it is relayed.
fn event_stream(chunks: TextStream) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = chunks.scan(false, |failed, chunk| {
        if *failed {
            return future::ready(None);
        }
        let payload = match chunk {
            Ok(text) => json!({ "text": text }),
            Err(e) => {
                *failed = true;
                tracing::error!(error = %e, "Language model stream failed");
                json!({ "error": "Internal server error" })
            }
        };
        future::ready(Some(Ok::<_, Infallible>(
            Event::default().data(payload.to_string()),
        )))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
