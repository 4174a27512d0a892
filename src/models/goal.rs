use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyGoal {
    pub id: i64,
    pub goal: String,
    pub completed: bool,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, message = "Goal text is required"))]
    pub goal: String,
}

#[derive(Debug, Serialize)]
pub struct GoalView {
    pub id: i64,
    pub goal: String,
    pub completed: bool,
    pub date: NaiveDate,
}

impl From<DailyGoal> for GoalView {
    fn from(g: DailyGoal) -> Self {
        Self {
            id: g.id,
            goal: g.goal,
            completed: g.completed,
            date: g.date,
        }
    }
}
