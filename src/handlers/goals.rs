use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use validator::Validate;

use crate::dto::SuccessResponse;
use crate::error::{AppError, AppResult};
use crate::models::goal::{CreateGoalRequest, DailyGoal, GoalView};
use crate::AppState;

/// Goals dated today (UTC) or later.
pub async fn list_goals(State(state): State<AppState>) -> AppResult<Json<Vec<GoalView>>> {
    let today = Utc::now().date_naive();

    let goals = sqlx::query_as::<_, DailyGoal>(
        "SELECT * FROM daily_goals WHERE date >= ? ORDER BY date ASC, id ASC",
    )
    .bind(today)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(goals.into_iter().map(GoalView::from).collect()))
}

pub async fn create_goal(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<CreateGoalRequest>, AppError>,
) -> AppResult<Json<SuccessResponse>> {
    body.validate()?;

    let now = Utc::now();
    let mut tx = state.db.begin().await?;
    sqlx::query("INSERT INTO daily_goals (goal, completed, date, timestamp) VALUES (?, ?, ?, ?)")
        .bind(&body.goal)
        .bind(false)
        .bind(now.date_naive())
        .bind(now)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(Json(SuccessResponse::ok()))
}
