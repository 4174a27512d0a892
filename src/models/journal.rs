use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JournalEntry {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    /// Comma-joined tag set.
    pub tags: Option<String>,
    pub prompt: Option<String>,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JournalPrompt {
    pub id: i64,
    pub prompt_text: String,
    pub category: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct PromptView {
    pub id: i64,
    pub text: String,
    pub category: Option<String>,
}

impl From<JournalPrompt> for PromptView {
    fn from(p: JournalPrompt) -> Self {
        Self {
            id: p.id,
            text: p.prompt_text,
            category: p.category,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PromptQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JournalQuery {
    pub page: Option<i64>,
    pub tag: Option<String>,
    pub mood: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JournalPage {
    pub entries: Vec<JournalEntry>,
    pub total_pages: i64,
    pub current_page: i64,
}

/// Tags arrive either already joined (`"a,b"`) or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    Joined(String),
    List(Vec<String>),
}

impl TagsInput {
    pub fn joined(&self) -> String {
        match self {
            TagsInput::Joined(s) => s.clone(),
            TagsInput::List(items) => {
                let mut seen: Vec<&str> = Vec::with_capacity(items.len());
                for tag in items.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
                    if !seen.contains(&tag) {
                        seen.push(tag);
                    }
                }
                seen.join(",")
            }
        }
    }
}

/// Body of both POST and PUT. `id` is only read on PUT.
#[derive(Debug, Deserialize)]
pub struct WriteJournalRequest {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
    pub tags: Option<TagsInput>,
    pub prompt: Option<String>,
    pub favorite: Option<bool>,
}

/// A write request with every required field present.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalFields {
    pub title: String,
    pub content: String,
    pub mood: String,
    pub tags: String,
    pub prompt: String,
    pub favorite: bool,
}

impl WriteJournalRequest {
    pub fn fields(&self) -> Result<JournalFields, String> {
        let missing = |name: &str| format!("Missing required field: {name}");
        Ok(JournalFields {
            title: self.title.clone().ok_or_else(|| missing("title"))?,
            content: self.content.clone().ok_or_else(|| missing("content"))?,
            mood: self.mood.clone().ok_or_else(|| missing("mood"))?,
            tags: self
                .tags
                .as_ref()
                .map(TagsInput::joined)
                .ok_or_else(|| missing("tags"))?,
            prompt: self.prompt.clone().unwrap_or_default(),
            favorite: self.favorite.unwrap_or(false),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SavedEntryResponse {
    pub id: i64,
    pub message: &'static str,
}

pub fn total_pages(total: i64) -> i64 {
    if total <= 0 {
        0
    } else {
        (total + PAGE_SIZE - 1) / PAGE_SIZE
    }
}
