use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeelingCheck {
    pub id: i64,
    pub feeling: String,
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct FeelingRequest {
    pub feeling: Option<String>,
    pub note: Option<String>,
}

/// The five feelings the check-in widget offers. Anything else is stored
/// verbatim and answered with [`FALLBACK_RESPONSE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feeling {
    Great,
    Good,
    Okay,
    Bad,
    Terrible,
}

pub const FALLBACK_RESPONSE: &str =
    "Thank you for sharing how you're feeling. Would you like to talk about it?";

impl Feeling {
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Great" => Some(Self::Great),
            "Good" => Some(Self::Good),
            "Okay" => Some(Self::Okay),
            "Bad" => Some(Self::Bad),
            "Terrible" => Some(Self::Terrible),
            _ => None,
        }
    }

    pub fn response(self) -> &'static str {
        match self {
            Self::Great => "That's wonderful to hear! What's making today so great for you?",
            Self::Good => "I'm glad you're feeling good! Would you like to share what's going well?",
            Self::Okay => {
                "Sometimes 'okay' is perfectly fine. Is there anything you'd like to talk about?"
            }
            Self::Bad => {
                "I'm sorry you're not feeling your best. Would you like to talk about what's troubling you?"
            }
            Self::Terrible => {
                "I'm here for you during this difficult time. Would you like to share what's making you feel this way?"
            }
        }
    }
}

pub fn response_for(label: &str) -> &'static str {
    Feeling::parse(label).map_or(FALLBACK_RESPONSE, Feeling::response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_feelings_have_specific_responses() {
        for label in ["Great", "Good", "Okay", "Bad", "Terrible"] {
            assert_ne!(response_for(label), FALLBACK_RESPONSE, "{label}");
        }
        assert_eq!(
            response_for("Great"),
            "That's wonderful to hear! What's making today so great for you?"
        );
    }

    #[test]
    fn test_unknown_feelings_fall_back() {
        // lookup is case-sensitive
        for label in ["great", "Anxious", "", "Terrible "] {
            assert_eq!(response_for(label), FALLBACK_RESPONSE, "{label:?}");
        }
    }
}
