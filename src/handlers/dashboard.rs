use std::collections::BTreeMap;

use axum::{extract::State, Json};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::error::AppResult;
use crate::models::{
    breathing::BreathingSession, chat::ChatInteraction, feeling::FeelingCheck, goal::DailyGoal,
};
use crate::AppState;

const RECENT_FEELINGS: i64 = 30;
const RECENT_CHATS: i64 = 50;
const RECENT_BREATHING: i64 = 20;

#[derive(Debug, Serialize)]
pub struct FeelingView {
    pub feeling: String,
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct InteractionView {
    pub message: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BreathingView {
    #[serde(rename = "type")]
    pub exercise_type: String,
    pub duration: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct GoalProgressView {
    pub goal: String,
    pub completed: bool,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub feelings: Vec<FeelingView>,
    pub interactions: Vec<InteractionView>,
    pub breathing_sessions: Vec<BreathingView>,
    pub goals: Vec<GoalProgressView>,
}

/// GET /api/progress
pub async fn progress(State(state): State<AppState>) -> AppResult<Json<ProgressResponse>> {
    let today = Utc::now().date_naive();

    let feelings = sqlx::query_as::<_, FeelingCheck>(
        "SELECT * FROM feeling_checks ORDER BY timestamp DESC, id DESC LIMIT ?",
    )
    .bind(RECENT_FEELINGS)
    .fetch_all(&state.db)
    .await?;

    let chats = sqlx::query_as::<_, ChatInteraction>(
        "SELECT * FROM chat_interactions ORDER BY timestamp DESC, id DESC LIMIT ?",
    )
    .bind(RECENT_CHATS)
    .fetch_all(&state.db)
    .await?;

    let breathing = sqlx::query_as::<_, BreathingSession>(
        "SELECT * FROM breathing_sessions ORDER BY timestamp DESC, id DESC LIMIT ?",
    )
    .bind(RECENT_BREATHING)
    .fetch_all(&state.db)
    .await?;

    let goals = sqlx::query_as::<_, DailyGoal>(
        "SELECT * FROM daily_goals WHERE date >= ? ORDER BY date ASC, id ASC",
    )
    .bind(today)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ProgressResponse {
        feelings: feelings
            .into_iter()
            .map(|f| FeelingView {
                feeling: f.feeling,
                note: f.note,
                timestamp: f.timestamp,
            })
            .collect(),
        interactions: chats
            .into_iter()
            .map(|c| InteractionView {
                message: c.user_message,
                response: c.bot_response,
                timestamp: c.timestamp,
            })
            .collect(),
        breathing_sessions: breathing
            .into_iter()
            .map(|b| BreathingView {
                exercise_type: b.exercise_type,
                duration: b.duration,
                timestamp: b.timestamp,
            })
            .collect(),
        goals: goals
            .into_iter()
            .map(|g| GoalProgressView {
                goal: g.goal,
                completed: g.completed,
                date: g.date,
            })
            .collect(),
    }))
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct MoodTrends {
    /// Distinct calendar days (UTC) with at least one check, ascending.
    pub dates: Vec<String>,
    /// Totals per feeling label across the whole period.
    pub mood_counts: BTreeMap<String, i64>,
    /// Per-day totals per feeling label.
    pub daily: BTreeMap<String, BTreeMap<String, i64>>,
}

pub fn bucket_moods(checks: &[FeelingCheck]) -> MoodTrends {
    let mut trends = MoodTrends::default();
    for check in checks {
        let day = check.timestamp.format("%Y-%m-%d").to_string();
        *trends.mood_counts.entry(check.feeling.clone()).or_insert(0) += 1;
        *trends
            .daily
            .entry(day)
            .or_default()
            .entry(check.feeling.clone())
            .or_insert(0) += 1;
    }
    trends.dates = trends.daily.keys().cloned().collect();
    trends
}

/// GET /api/visualizations/mood-trends
pub async fn mood_trends(State(state): State<AppState>) -> AppResult<Json<MoodTrends>> {
    let since = Utc::now() - Duration::days(7);

    let checks = sqlx::query_as::<_, FeelingCheck>(
        "SELECT * FROM feeling_checks WHERE timestamp >= ? ORDER BY timestamp ASC",
    )
    .bind(since)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(bucket_moods(&checks)))
}

#[derive(Debug, Serialize)]
pub struct WellnessStats {
    pub journal_entries: i64,
    pub breathing_sessions: i64,
    pub completed_goals: i64,
    pub total_goals: i64,
    pub goal_completion_rate: f64,
}

/// Percentage of goals completed; 0 when there are none.
pub fn completion_rate(completed: i64, total: i64) -> f64 {
    if total > 0 {
        completed as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// GET /api/visualizations/wellness-stats
pub async fn wellness_stats(State(state): State<AppState>) -> AppResult<Json<WellnessStats>> {
    let since = Utc::now() - Duration::days(30);
    let since_date = since.date_naive();

    let journal_entries =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM journal_entries WHERE created_at >= ?")
            .bind(since)
            .fetch_one(&state.db)
            .await?;

    let breathing_sessions =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM breathing_sessions WHERE timestamp >= ?")
            .bind(since)
            .fetch_one(&state.db)
            .await?;

    let completed_goals = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM daily_goals WHERE date >= ? AND completed = 1",
    )
    .bind(since_date)
    .fetch_one(&state.db)
    .await?;

    let total_goals =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM daily_goals WHERE date >= ?")
            .bind(since_date)
            .fetch_one(&state.db)
            .await?;

    Ok(Json(WellnessStats {
        journal_entries,
        breathing_sessions,
        completed_goals,
        total_goals,
        goal_completion_rate: completion_rate(completed_goals, total_goals),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn check(id: i64, feeling: &str, ts: DateTime<Utc>) -> FeelingCheck {
        FeelingCheck {
            id,
            feeling: feeling.into(),
            note: None,
            timestamp: ts,
        }
    }

    #[test]
    fn test_completion_rate_without_goals_is_zero() {
        assert_eq!(completion_rate(0, 0), 0.0);
    }

    #[test]
    fn test_completion_rate_percentage() {
        assert_eq!(completion_rate(1, 4), 25.0);
        assert_eq!(completion_rate(3, 3), 100.0);
    }

    #[test]
    fn test_bucket_moods_by_day_and_label() {
        let day1 = Utc.with_ymd_and_hms(2026, 3, 2, 23, 59, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2026, 3, 3, 0, 1, 0).unwrap();
        let checks = vec![
            check(1, "Good", day1),
            check(2, "Bad", day2),
            check(3, "Good", day2),
            check(4, "Good", day2),
        ];

        let trends = bucket_moods(&checks);
        assert_eq!(trends.dates, vec!["2026-03-02", "2026-03-03"]);
        assert_eq!(trends.mood_counts["Good"], 3);
        assert_eq!(trends.mood_counts["Bad"], 1);
        assert_eq!(trends.daily["2026-03-02"]["Good"], 1);
        assert_eq!(trends.daily["2026-03-03"]["Good"], 2);
        assert_eq!(trends.daily["2026-03-03"]["Bad"], 1);
    }

    #[test]
    fn test_bucket_moods_empty() {
        assert_eq!(bucket_moods(&[]), MoodTrends::default());
    }
}
