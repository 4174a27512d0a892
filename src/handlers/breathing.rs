use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use validator::Validate;

use crate::dto::SuccessResponse;
use crate::error::{AppError, AppResult};
use crate::models::breathing::CreateBreathingRequest;
use crate::AppState;

pub async fn create_session(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<CreateBreathingRequest>, AppError>,
) -> AppResult<Json<SuccessResponse>> {
    body.validate()?;

    let mut tx = state.db.begin().await?;
    sqlx::query(
        "INSERT INTO breathing_sessions (exercise_type, duration, timestamp) VALUES (?, ?, ?)",
    )
    .bind(&body.exercise_type)
    .bind(body.duration)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(Json(SuccessResponse::ok()))
}
