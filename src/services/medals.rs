//! Medal service — awarded medals and the festival tally.
//!
//! DESIGN
//! ======
//! Medals are stored one row per award. The tally is computed in memory
//! from the team list and the medal rows so that teams without medals still
//! appear, and so ranking rules live in plain Rust rather than SQL.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::RecordError;
use super::teams::{self, Team};
use crate::validate::{self, ValidationError};

const TABLE: &str = "medals";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedalKind {
    Gold,
    Silver,
    Bronze,
}

impl MedalKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Silver => "silver",
            Self::Bronze => "bronze",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gold" => Some(Self::Gold),
            "silver" => Some(Self::Silver),
            "bronze" => Some(Self::Bronze),
            _ => None,
        }
    }
}

/// Row of the `medals` table.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Medal {
    pub id: Uuid,
    pub sport_id: Uuid,
    pub team_id: Uuid,
    pub medal: String,
    #[serde(with = "time::serde::rfc3339")]
    pub awarded_at: OffsetDateTime,
}

impl Medal {
    #[must_use]
    pub fn kind(&self) -> Option<MedalKind> {
        MedalKind::parse(&self.medal)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MedalDraft {
    pub sport_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub medal: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MedalPatch {
    pub sport_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub medal: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MedalFields {
    pub sport_id: Uuid,
    pub team_id: Uuid,
    pub medal: MedalKind,
}

impl MedalDraft {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a missing id or unknown medal.
    pub fn validate(&self) -> Result<MedalFields, ValidationError> {
        let sport_id = validate::required("sport_id", self.sport_id)?;
        let team_id = validate::required("team_id", self.team_id)?;
        let raw = validate::required_text("medal", self.medal.as_deref())?;
        let medal = MedalKind::parse(&raw)
            .ok_or_else(|| ValidationError::new("medal", "medal must be gold, silver or bronze"))?;
        Ok(MedalFields { sport_id, team_id, medal })
    }
}

impl Medal {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the merged row is invalid.
    pub fn apply(&self, patch: &MedalPatch) -> Result<MedalFields, ValidationError> {
        MedalDraft {
            sport_id: Some(validate::merge(self.sport_id, patch.sport_id)),
            team_id: Some(validate::merge(self.team_id, patch.team_id)),
            medal: Some(validate::merge(self.medal.clone(), patch.medal.clone())),
        }
        .validate()
    }
}

// =============================================================================
// TALLY
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MedalCounts {
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
    pub total: u32,
}

impl MedalCounts {
    fn add(&mut self, kind: MedalKind) {
        match kind {
            MedalKind::Gold => self.gold += 1,
            MedalKind::Silver => self.silver += 1,
            MedalKind::Bronze => self.bronze += 1,
        }
        self.total += 1;
    }

    /// Counts for a single team.
    #[must_use]
    pub fn for_team(team_id: Uuid, medals: &[Medal]) -> Self {
        let mut counts = Self::default();
        for kind in medals
            .iter()
            .filter(|m| m.team_id == team_id)
            .filter_map(Medal::kind)
        {
            counts.add(kind);
        }
        counts
    }

    fn ranking_key(self) -> (u32, u32, u32) {
        (self.gold, self.silver, self.bronze)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyRow {
    pub rank: u32,
    pub team_id: Uuid,
    pub team_name: String,
    pub logo_url: Option<String>,
    #[serde(flatten)]
    pub counts: MedalCounts,
}

/// Build the medal table.
///
/// Every team gets a row. Rows order by gold, then silver, then bronze
/// (all descending), then team name. Teams level on all three counts share
/// a rank and the following rank is skipped (1, 2, 2, 4).
#[must_use]
pub fn compute_tally(teams: &[Team], medals: &[Medal]) -> Vec<TallyRow> {
    let mut counts: HashMap<Uuid, MedalCounts> = HashMap::new();
    for medal in medals {
        if let Some(kind) = medal.kind() {
            counts.entry(medal.team_id).or_default().add(kind);
        }
    }

    let mut rows: Vec<TallyRow> = teams
        .iter()
        .map(|team| TallyRow {
            rank: 0,
            team_id: team.id,
            team_name: team.name.clone(),
            logo_url: team.logo_url.clone(),
            counts: counts.get(&team.id).copied().unwrap_or_default(),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.counts
            .ranking_key()
            .cmp(&a.counts.ranking_key())
            .then_with(|| a.team_name.cmp(&b.team_name))
            .then_with(|| a.team_id.cmp(&b.team_id))
    });

    let mut previous: Option<(u32, u32, u32)> = None;
    let mut rank = 0_u32;
    for (index, row) in rows.iter_mut().enumerate() {
        let key = row.counts.ranking_key();
        if previous != Some(key) {
            rank = u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1);
            previous = Some(key);
        }
        row.rank = rank;
    }
    rows
}

// =============================================================================
// CRUD
// =============================================================================

/// List medal rows, newest award first, optionally for one sport.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list(pool: &PgPool, sport_id: Option<Uuid>) -> Result<Vec<Medal>, RecordError> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT id, sport_id, team_id, medal, awarded_at FROM medals");
    if let Some(sport_id) = sport_id {
        builder.push(" WHERE sport_id = ");
        builder.push_bind(sport_id);
    }
    builder.push(" ORDER BY awarded_at DESC, id ASC");
    let rows = builder.build_query_as::<Medal>().fetch_all(pool).await?;
    Ok(rows)
}

/// Medal counts for one team across all sports.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn counts_for_team(pool: &PgPool, team_id: Uuid) -> Result<MedalCounts, RecordError> {
    let rows = sqlx::query_as::<_, Medal>(
        "SELECT id, sport_id, team_id, medal, awarded_at FROM medals WHERE team_id = $1",
    )
    .bind(team_id)
    .fetch_all(pool)
    .await?;
    Ok(MedalCounts::for_team(team_id, &rows))
}

/// Load teams and medals and compute the tally.
///
/// # Errors
///
/// Returns a database error if either query fails.
pub async fn tally(pool: &PgPool, sport_id: Option<Uuid>) -> Result<Vec<TallyRow>, RecordError> {
    let teams = teams::list(pool).await?;
    let medals = list(pool, sport_id).await?;
    Ok(compute_tally(&teams, &medals))
}

/// # Errors
///
/// Returns `NotFound` if no medal has this id.
pub async fn get(pool: &PgPool, id: Uuid) -> Result<Medal, RecordError> {
    sqlx::query_as::<_, Medal>("SELECT id, sport_id, team_id, medal, awarded_at FROM medals WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(RecordError::not_found(TABLE, id))
}

/// # Errors
///
/// Returns a validation error, `Conflict` for unknown ids, or a database error.
pub async fn create(pool: &PgPool, draft: &MedalDraft) -> Result<Medal, RecordError> {
    let fields = draft.validate()?;
    let row = sqlx::query_as::<_, Medal>(
        "INSERT INTO medals (id, sport_id, team_id, medal) VALUES ($1, $2, $3, $4)
         RETURNING id, sport_id, team_id, medal, awarded_at",
    )
    .bind(Uuid::new_v4())
    .bind(fields.sport_id)
    .bind(fields.team_id)
    .bind(fields.medal.as_str())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns `NotFound`, a validation error, `Conflict`, or a database error.
pub async fn update(pool: &PgPool, id: Uuid, patch: &MedalPatch) -> Result<Medal, RecordError> {
    let current = get(pool, id).await?;
    let fields = current.apply(patch)?;
    sqlx::query_as::<_, Medal>(
        "UPDATE medals SET sport_id = $2, team_id = $3, medal = $4 WHERE id = $1
         RETURNING id, sport_id, team_id, medal, awarded_at",
    )
    .bind(id)
    .bind(fields.sport_id)
    .bind(fields.team_id)
    .bind(fields.medal.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or(RecordError::not_found(TABLE, id))
}

/// # Errors
///
/// Returns `NotFound` if nothing was deleted.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), RecordError> {
    let result = sqlx::query("DELETE FROM medals WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RecordError::not_found(TABLE, id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "medals_test.rs"]
mod tests;
