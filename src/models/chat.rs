use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatInteraction {
    pub id: i64,
    pub user_message: String,
    pub bot_response: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub contents: Option<serde_json::Value>,
    #[serde(default)]
    pub stream: bool,
    pub model: Option<String>,
}

/// Pulls the prompt text out of `contents`, which is either a plain string or
/// a Gemini-style structure (`[{"parts": [{"text": ...}]}]`). Every `text`
/// field found is joined with newlines. Returns `None` when nothing is left
/// after trimming.
pub fn prompt_text(contents: &serde_json::Value) -> Option<String> {
    let mut pieces = Vec::new();
    collect_text(contents, &mut pieces);
    let text = pieces.join("\n");
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn collect_text<'a>(value: &'a serde_json::Value, out: &mut Vec<&'a str>) {
    match value {
        serde_json::Value::String(s) => out.push(s),
        serde_json::Value::Array(items) => {
            for item in items {
                collect_text(item, out);
            }
        }
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(s)) = map.get("text") {
                out.push(s);
            } else {
                for (key, item) in map {
                    if key != "role" {
                        collect_text(item, out);
                    }
                }
            }
        }
        _ => {}
    }
}
