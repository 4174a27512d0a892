use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BreathingSession {
    pub id: i64,
    pub exercise_type: String,
    /// Minutes.
    pub duration: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBreathingRequest {
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Exercise type is required"))]
    pub exercise_type: String,
    #[validate(range(min = 1, message = "Duration must be at least one minute"))]
    pub duration: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_reads_type_field() {
        let req: CreateBreathingRequest =
            serde_json::from_str(r#"{"type":"box","duration":4}"#).unwrap();
        assert_eq!(req.exercise_type, "box");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_zero_duration_is_invalid() {
        let req: CreateBreathingRequest =
            serde_json::from_str(r#"{"type":"box","duration":0}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
