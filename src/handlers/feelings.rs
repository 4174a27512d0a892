use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use chrono::Utc;

use crate::dto::StatusResponse;
use crate::error::{AppError, AppResult};
use crate::models::feeling::{self, FeelingRequest};
use crate::AppState;

pub async fn record_feeling(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<FeelingRequest>, AppError>,
) -> AppResult<Json<StatusResponse>> {
    let label = body
        .feeling
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::Validation("Feeling is required".into()))?;

    let mut tx = state.db.begin().await?;
    sqlx::query("INSERT INTO feeling_checks (feeling, note, timestamp) VALUES (?, ?, ?)")
        .bind(&label)
        .bind(&body.note)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::debug!(feeling = %label, "Feeling check recorded");

    Ok(Json(StatusResponse::success(feeling::response_for(&label))))
}
