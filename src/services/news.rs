//! News service — announcements shown on the portal front page.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::RecordError;
use super::matches::parse_timestamp;
use crate::validate::{self, ValidationError};

const TABLE: &str = "news";

pub const DEFAULT_LIST_LIMIT: i64 = 20;
pub const MAX_LIST_LIMIT: i64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct NewsPost {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsDraft {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
    /// Defaults to the time of creation.
    pub published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(default, deserialize_with = "validate::nullable")]
    pub image_url: Option<Option<String>>,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsFields {
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub published_at: OffsetDateTime,
}

impl NewsDraft {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank title/body or bad timestamp.
    pub fn validate(&self, now: OffsetDateTime) -> Result<NewsFields, ValidationError> {
        let title = validate::required_text("title", self.title.as_deref())?;
        let body = validate::required_text("body", self.body.as_deref())?;
        let published_at = match validate::optional_text(self.published_at.as_deref()) {
            Some(raw) => parse_timestamp("published_at", &raw)?,
            None => now,
        };
        Ok(NewsFields { title, body, image_url: validate::optional_text(self.image_url.as_deref()), published_at })
    }
}

impl NewsPost {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the merged row is incomplete.
    pub fn apply(&self, patch: &NewsPatch) -> Result<NewsFields, ValidationError> {
        let published_at = match patch.published_at.as_deref() {
            Some(raw) => parse_timestamp("published_at", raw)?,
            None => self.published_at,
        };
        let title = validate::required_text("title", Some(patch.title.as_deref().unwrap_or(&self.title)))?;
        let body = validate::required_text("body", Some(patch.body.as_deref().unwrap_or(&self.body)))?;
        let image_url = validate::merge(self.image_url.clone(), patch.image_url.clone());
        Ok(NewsFields { title, body, image_url: validate::optional_text(image_url.as_deref()), published_at })
    }
}

/// Clamp a requested page size to `1..=MAX_LIST_LIMIT`.
#[must_use]
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

/// Newest posts first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list(pool: &PgPool, limit: Option<i64>) -> Result<Vec<NewsPost>, RecordError> {
    let rows = sqlx::query_as::<_, NewsPost>(
        "SELECT id, title, body, image_url, published_at, created_at FROM news
         ORDER BY published_at DESC, id ASC LIMIT $1",
    )
    .bind(clamp_limit(limit))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns `NotFound` if no post has this id.
pub async fn get(pool: &PgPool, id: Uuid) -> Result<NewsPost, RecordError> {
    sqlx::query_as::<_, NewsPost>(
        "SELECT id, title, body, image_url, published_at, created_at FROM news WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(RecordError::not_found(TABLE, id))
}

/// # Errors
///
/// Returns a validation error or a database error.
pub async fn create(pool: &PgPool, draft: &NewsDraft, now: OffsetDateTime) -> Result<NewsPost, RecordError> {
    let fields = draft.validate(now)?;
    let row = sqlx::query_as::<_, NewsPost>(
        "INSERT INTO news (id, title, body, image_url, published_at) VALUES ($1, $2, $3, $4, $5)
         RETURNING id, title, body, image_url, published_at, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(&fields.title)
    .bind(&fields.body)
    .bind(&fields.image_url)
    .bind(fields.published_at)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns `NotFound`, a validation error, or a database error.
pub async fn update(pool: &PgPool, id: Uuid, patch: &NewsPatch) -> Result<NewsPost, RecordError> {
    let current = get(pool, id).await?;
    let fields = current.apply(patch)?;
    sqlx::query_as::<_, NewsPost>(
        "UPDATE news SET title = $2, body = $3, image_url = $4, published_at = $5 WHERE id = $1
         RETURNING id, title, body, image_url, published_at, created_at",
    )
    .bind(id)
    .bind(&fields.title)
    .bind(&fields.body)
    .bind(&fields.image_url)
    .bind(fields.published_at)
    .fetch_optional(pool)
    .await?
    .ok_or(RecordError::not_found(TABLE, id))
}

/// # Errors
///
/// Returns `NotFound` if nothing was deleted.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), RecordError> {
    let result = sqlx::query("DELETE FROM news WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RecordError::not_found(TABLE, id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "news_test.rs"]
mod tests;
