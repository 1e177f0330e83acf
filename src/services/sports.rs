//! Sport service — the disciplines contested at the festival.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::RecordError;
use crate::validate::{self, ValidationError};

const TABLE: &str = "sports";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportKind {
    Team,
    Individual,
}

impl SportKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::Individual => "individual",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "team" => Some(Self::Team),
            "individual" => Some(Self::Individual),
            _ => None,
        }
    }
}

/// Row of the `sports` table.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Sport {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Create form as submitted.
#[derive(Debug, Default, Deserialize)]
pub struct SportDraft {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SportPatch {
    pub name: Option<String>,
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "validate::nullable")]
    pub image_url: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SportFields {
    pub name: String,
    pub kind: SportKind,
    pub image_url: Option<String>,
}

fn parse_kind(raw: Option<&str>) -> Result<SportKind, ValidationError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(SportKind::Team),
        Some(value) => {
            SportKind::parse(value).ok_or_else(|| ValidationError::new("kind", "kind must be team or individual"))
        }
    }
}

impl SportDraft {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the name is blank or the kind unknown.
    pub fn validate(&self) -> Result<SportFields, ValidationError> {
        Ok(SportFields {
            name: validate::required_text("name", self.name.as_deref())?,
            kind: parse_kind(self.kind.as_deref())?,
            image_url: validate::optional_text(self.image_url.as_deref()),
        })
    }
}

impl Sport {
    /// Merge a patch over this row and re-validate the result.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the merged row is incomplete.
    pub fn apply(&self, patch: &SportPatch) -> Result<SportFields, ValidationError> {
        let merged = SportDraft {
            name: Some(validate::merge(self.name.clone(), patch.name.clone())),
            kind: Some(validate::merge(self.kind.clone(), patch.kind.clone())),
            image_url: validate::merge(self.image_url.clone(), patch.image_url.clone()),
        };
        merged.validate()
    }
}

// =============================================================================
// CRUD
// =============================================================================

/// List all sports alphabetically.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list(pool: &PgPool) -> Result<Vec<Sport>, RecordError> {
    let rows = sqlx::query_as::<_, Sport>(
        "SELECT id, name, kind, image_url, created_at FROM sports ORDER BY name ASC, id ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns `NotFound` if no sport has this id.
pub async fn get(pool: &PgPool, id: Uuid) -> Result<Sport, RecordError> {
    sqlx::query_as::<_, Sport>("SELECT id, name, kind, image_url, created_at FROM sports WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(RecordError::not_found(TABLE, id))
}

/// # Errors
///
/// Returns a validation error for an incomplete form, or a database error.
pub async fn create(pool: &PgPool, draft: &SportDraft) -> Result<Sport, RecordError> {
    let fields = draft.validate()?;
    let row = sqlx::query_as::<_, Sport>(
        "INSERT INTO sports (id, name, kind, image_url) VALUES ($1, $2, $3, $4)
         RETURNING id, name, kind, image_url, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(&fields.name)
    .bind(fields.kind.as_str())
    .bind(&fields.image_url)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns `NotFound`, a validation error, or a database error.
pub async fn update(pool: &PgPool, id: Uuid, patch: &SportPatch) -> Result<Sport, RecordError> {
    let current = get(pool, id).await?;
    let fields = current.apply(patch)?;
    sqlx::query_as::<_, Sport>(
        "UPDATE sports SET name = $2, kind = $3, image_url = $4 WHERE id = $1
         RETURNING id, name, kind, image_url, created_at",
    )
    .bind(id)
    .bind(&fields.name)
    .bind(fields.kind.as_str())
    .bind(&fields.image_url)
    .fetch_optional(pool)
    .await?
    .ok_or(RecordError::not_found(TABLE, id))
}

/// # Errors
///
/// Returns `NotFound` if nothing was deleted, or `Conflict` while matches
/// still reference the sport.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), RecordError> {
    let result = sqlx::query("DELETE FROM sports WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RecordError::not_found(TABLE, id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "sports_test.rs"]
mod tests;
