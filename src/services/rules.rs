//! Rule service — rulebook entries, general or per sport.

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::RecordError;
use crate::validate::{self, ValidationError};

const TABLE: &str = "rules";

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Rule {
    pub id: Uuid,
    /// `None` for festival-wide rules.
    pub sport_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub document_url: Option<String>,
    pub sort_order: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct RuleDraft {
    pub sport_id: Option<Uuid>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub document_url: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RulePatch {
    #[serde(default, deserialize_with = "validate::nullable")]
    pub sport_id: Option<Option<Uuid>>,
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "validate::nullable")]
    pub document_url: Option<Option<String>>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFields {
    pub sport_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub document_url: Option<String>,
    pub sort_order: i32,
}

impl RuleDraft {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when title or content is blank.
    pub fn validate(&self) -> Result<RuleFields, ValidationError> {
        Ok(RuleFields {
            sport_id: self.sport_id,
            title: validate::required_text("title", self.title.as_deref())?,
            content: validate::required_text("content", self.content.as_deref())?,
            document_url: validate::optional_text(self.document_url.as_deref()),
            sort_order: self.sort_order.unwrap_or(0),
        })
    }
}

impl Rule {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the merged row is incomplete.
    pub fn apply(&self, patch: &RulePatch) -> Result<RuleFields, ValidationError> {
        RuleDraft {
            sport_id: validate::merge(self.sport_id, patch.sport_id),
            title: Some(validate::merge(self.title.clone(), patch.title.clone())),
            content: Some(validate::merge(self.content.clone(), patch.content.clone())),
            document_url: validate::merge(self.document_url.clone(), patch.document_url.clone()),
            sort_order: Some(validate::merge(self.sort_order, patch.sort_order)),
        }
        .validate()
    }
}

/// List rules in display order. With a sport filter, festival-wide rules
/// are included alongside that sport's rules.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list(pool: &PgPool, sport_id: Option<Uuid>) -> Result<Vec<Rule>, RecordError> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT id, sport_id, title, content, document_url, sort_order, created_at FROM rules",
    );
    if let Some(sport_id) = sport_id {
        builder.push(" WHERE sport_id IS NULL OR sport_id = ");
        builder.push_bind(sport_id);
    }
    builder.push(" ORDER BY sort_order ASC, title ASC, id ASC");
    let rows = builder.build_query_as::<Rule>().fetch_all(pool).await?;
    Ok(rows)
}

/// # Errors
///
/// Returns `NotFound` if no rule has this id.
pub async fn get(pool: &PgPool, id: Uuid) -> Result<Rule, RecordError> {
    sqlx::query_as::<_, Rule>(
        "SELECT id, sport_id, title, content, document_url, sort_order, created_at FROM rules WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(RecordError::not_found(TABLE, id))
}

/// # Errors
///
/// Returns a validation error, `Conflict`, or a database error.
pub async fn create(pool: &PgPool, draft: &RuleDraft) -> Result<Rule, RecordError> {
    let fields = draft.validate()?;
    let row = sqlx::query_as::<_, Rule>(
        "INSERT INTO rules (id, sport_id, title, content, document_url, sort_order)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, sport_id, title, content, document_url, sort_order, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(fields.sport_id)
    .bind(&fields.title)
    .bind(&fields.content)
    .bind(&fields.document_url)
    .bind(fields.sort_order)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns `NotFound`, a validation error, `Conflict`, or a database error.
pub async fn update(pool: &PgPool, id: Uuid, patch: &RulePatch) -> Result<Rule, RecordError> {
    let current = get(pool, id).await?;
    let fields = current.apply(patch)?;
    sqlx::query_as::<_, Rule>(
        "UPDATE rules SET sport_id = $2, title = $3, content = $4, document_url = $5, sort_order = $6
         WHERE id = $1
         RETURNING id, sport_id, title, content, document_url, sort_order, created_at",
    )
    .bind(id)
    .bind(fields.sport_id)
    .bind(&fields.title)
    .bind(&fields.content)
    .bind(&fields.document_url)
    .bind(fields.sort_order)
    .fetch_optional(pool)
    .await?
    .ok_or(RecordError::not_found(TABLE, id))
}

/// # Errors
///
/// Returns `NotFound` if nothing was deleted.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), RecordError> {
    let result = sqlx::query("DELETE FROM rules WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RecordError::not_found(TABLE, id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "rules_test.rs"]
mod tests;
