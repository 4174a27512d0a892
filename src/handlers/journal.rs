use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;

use crate::dto::MessageResponse;
use crate::error::{AppError, AppResult};
use crate::models::journal::{
    total_pages, JournalEntry, JournalPage, JournalPrompt, JournalQuery, PromptQuery, PromptView,
    SavedEntryResponse, WriteJournalRequest, PAGE_SIZE,
};
use crate::AppState;

const SAVED: &str = "Journal entry saved successfully";

fn entry_not_found() -> AppError {
    AppError::NotFound("Entry not found".into())
}

fn page_not_found() -> AppError {
    AppError::NotFound("Page not found".into())
}

pub async fn list_prompts(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<PromptQuery>, AppError>,
) -> AppResult<Json<Vec<PromptView>>> {
    let category = query.category.filter(|c| !c.is_empty());

    let prompts = sqlx::query_as::<_, JournalPrompt>(
        r#"
        SELECT * FROM journal_prompts
        WHERE is_active = 1 AND (?1 IS NULL OR category = ?1)
        ORDER BY id ASC
        "#,
    )
    .bind(&category)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(prompts.into_iter().map(PromptView::from).collect()))
}

/// Newest first, ten per page. `tag` matches any substring of the stored tag
/// string; `mood` must match exactly.
pub async fn list_entries(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<JournalQuery>, AppError>,
) -> AppResult<Json<JournalPage>> {
    let page = query.page.unwrap_or(1);
    if page < 1 {
        return Err(page_not_found());
    }
    let offset = (page - 1)
        .checked_mul(PAGE_SIZE)
        .ok_or_else(page_not_found)?;
    let tag = query.tag.filter(|t| !t.is_empty());
    let mood = query.mood.filter(|m| !m.is_empty());

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM journal_entries
        WHERE (?1 IS NULL OR instr(tags, ?1) > 0)
          AND (?2 IS NULL OR mood = ?2)
        "#,
    )
    .bind(&tag)
    .bind(&mood)
    .fetch_one(&state.db)
    .await?;

    let entries = sqlx::query_as::<_, JournalEntry>(
        r#"
        SELECT * FROM journal_entries
        WHERE (?1 IS NULL OR instr(tags, ?1) > 0)
          AND (?2 IS NULL OR mood = ?2)
        ORDER BY created_at DESC, id DESC
        LIMIT ?3 OFFSET ?4
        "#,
    )
    .bind(&tag)
    .bind(&mood)
    .bind(PAGE_SIZE)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    if entries.is_empty() && page != 1 {
        return Err(page_not_found());
    }

    Ok(Json(JournalPage {
        entries,
        total_pages: total_pages(total),
        current_page: page,
    }))
}

pub async fn create_entry(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<WriteJournalRequest>, AppError>,
) -> AppResult<Json<SavedEntryResponse>> {
    let fields = body.fields().map_err(AppError::Validation)?;

    let mut tx = state.db.begin().await?;
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO journal_entries (title, content, mood, tags, prompt, favorite, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.content)
    .bind(&fields.mood)
    .bind(&fields.tags)
    .bind(&fields.prompt)
    .bind(fields.favorite)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!(entry_id = id, "Journal entry created");

    Ok(Json(SavedEntryResponse { id, message: SAVED }))
}

pub async fn update_entry(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<WriteJournalRequest>, AppError>,
) -> AppResult<Json<SavedEntryResponse>> {
    let id = body
        .id
        .ok_or_else(|| AppError::Validation("Entry ID required for update".into()))?;

    let mut tx = state.db.begin().await?;
    sqlx::query_scalar::<_, i64>("SELECT id FROM journal_entries WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(entry_not_found)?;

    let fields = body.fields().map_err(AppError::Validation)?;

    sqlx::query(
        r#"
        UPDATE journal_entries SET
            title = ?, content = ?, mood = ?, tags = ?, prompt = ?, favorite = ?
        WHERE id = ?
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.content)
    .bind(&fields.mood)
    .bind(&fields.tags)
    .bind(&fields.prompt)
    .bind(fields.favorite)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!(entry_id = id, "Journal entry updated");

    Ok(Json(SavedEntryResponse { id, message: SAVED }))
}

pub async fn get_entry(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<JournalEntry>> {
    let entry = sqlx::query_as::<_, JournalEntry>("SELECT * FROM journal_entries WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(entry_not_found)?;

    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<MessageResponse>> {
    let mut tx = state.db.begin().await?;
    let result = sqlx::query("DELETE FROM journal_entries WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(entry_not_found());
    }
    tx.commit().await?;

    tracing::info!(entry_id = id, "Journal entry deleted");

    Ok(Json(MessageResponse {
        message: "Entry deleted successfully",
    }))
}
