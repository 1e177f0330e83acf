//! Team service — participating teams and the per-team detail view.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::RecordError;
use super::matches::{self, MatchFilter, MatchView};
use super::medals::{self, MedalCounts};
use crate::validate::{self, ValidationError};

const TABLE: &str = "teams";

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub short_name: Option<String>,
    pub logo_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct TeamDraft {
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TeamPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "validate::nullable")]
    pub short_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "validate::nullable")]
    pub logo_url: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamFields {
    pub name: String,
    pub short_name: Option<String>,
    pub logo_url: Option<String>,
}

/// Team page: the team, its fixtures and results, and its medal haul.
#[derive(Debug, Clone, Serialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    pub matches: Vec<MatchView>,
    pub medals: MedalCounts,
}

impl TeamDraft {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the name is blank.
    pub fn validate(&self) -> Result<TeamFields, ValidationError> {
        Ok(TeamFields {
            name: validate::required_text("name", self.name.as_deref())?,
            short_name: validate::optional_text(self.short_name.as_deref()),
            logo_url: validate::optional_text(self.logo_url.as_deref()),
        })
    }
}

impl Team {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the merged row is incomplete.
    pub fn apply(&self, patch: &TeamPatch) -> Result<TeamFields, ValidationError> {
        TeamDraft {
            name: Some(validate::merge(self.name.clone(), patch.name.clone())),
            short_name: validate::merge(self.short_name.clone(), patch.short_name.clone()),
            logo_url: validate::merge(self.logo_url.clone(), patch.logo_url.clone()),
        }
        .validate()
    }
}

/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list(pool: &PgPool) -> Result<Vec<Team>, RecordError> {
    let rows = sqlx::query_as::<_, Team>(
        "SELECT id, name, short_name, logo_url, created_at FROM teams ORDER BY name ASC, id ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns `NotFound` if no team has this id.
pub async fn get(pool: &PgPool, id: Uuid) -> Result<Team, RecordError> {
    sqlx::query_as::<_, Team>("SELECT id, name, short_name, logo_url, created_at FROM teams WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(RecordError::not_found(TABLE, id))
}

/// Load a team together with its matches and medal counts.
///
/// # Errors
///
/// Returns `NotFound` if no team has this id, or a database error.
pub async fn get_detail(
    pool: &PgPool,
    id: Uuid,
    now: OffsetDateTime,
    match_duration: time::Duration,
) -> Result<TeamDetail, RecordError> {
    let team = get(pool, id).await?;
    let filter = MatchFilter { team_id: Some(id), ..MatchFilter::default() };
    let matches = matches::list(pool, &filter, now, match_duration).await?;
    let medals = medals::counts_for_team(pool, id).await?;
    Ok(TeamDetail { team, matches, medals })
}

/// # Errors
///
/// Returns a validation error for an incomplete form, or a database error.
pub async fn create(pool: &PgPool, draft: &TeamDraft) -> Result<Team, RecordError> {
    let fields = draft.validate()?;
    let row = sqlx::query_as::<_, Team>(
        "INSERT INTO teams (id, name, short_name, logo_url) VALUES ($1, $2, $3, $4)
         RETURNING id, name, short_name, logo_url, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(&fields.name)
    .bind(&fields.short_name)
    .bind(&fields.logo_url)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns `NotFound`, a validation error, or a database error.
pub async fn update(pool: &PgPool, id: Uuid, patch: &TeamPatch) -> Result<Team, RecordError> {
    let current = get(pool, id).await?;
    let fields = current.apply(patch)?;
    sqlx::query_as::<_, Team>(
        "UPDATE teams SET name = $2, short_name = $3, logo_url = $4 WHERE id = $1
         RETURNING id, name, short_name, logo_url, created_at",
    )
    .bind(id)
    .bind(&fields.name)
    .bind(&fields.short_name)
    .bind(&fields.logo_url)
    .fetch_optional(pool)
    .await?
    .ok_or(RecordError::not_found(TABLE, id))
}

/// # Errors
///
/// Returns `NotFound` if nothing was deleted, or `Conflict` while matches
/// still reference the team.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), RecordError> {
    let result = sqlx::query("DELETE FROM teams WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RecordError::not_found(TABLE, id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "teams_test.rs"]
mod tests;
