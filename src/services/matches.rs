//! Match service — fixtures, results, and wall-clock status.
//!
//! DESIGN
//! ======
//! A match row only stores its start (and optionally end) timestamp. Whether
//! it is upcoming, ongoing, or past is derived on every read by comparing
//! those timestamps against the current time, so there is no status column
//! to keep in sync. A match without an explicit end is treated as running
//! for the configured default duration.
//!
//! Filtering by sport or team happens in SQL; the status filter and final
//! ordering happen in memory after status is known.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use uuid::Uuid;

use super::error::RecordError;
use crate::validate::{self, ValidationError};

const TABLE: &str = "matches";

const SELECT_JOINED: &str = "SELECT m.id, m.sport_id, m.team1_id, m.team2_id, m.starts_at, m.ends_at, m.venue, \
     m.round, m.bracket_position, m.team1_score, m.team2_score, m.winner_id, m.created_at, \
     s.name AS sport_name, t1.name AS team1_name, t2.name AS team2_name, w.name AS winner_name \
     FROM matches m \
     JOIN sports s ON s.id = m.sport_id \
     JOIN teams t1 ON t1.id = m.team1_id \
     JOIN teams t2 ON t2.id = m.team2_id \
     LEFT JOIN teams w ON w.id = m.winner_id";

const RETURNING: &str = "RETURNING id, sport_id, team1_id, team2_id, starts_at, ends_at, venue, round, \
     bracket_position, team1_score, team2_score, winner_id, created_at";

// =============================================================================
// STATUS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Upcoming,
    Ongoing,
    Past,
}

impl MatchStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Past => "past",
        }
    }
}

/// Classify a match against `now`.
///
/// A recorded winner always means the match is over. Otherwise the match is
/// ongoing on the half-open interval `[starts_at, end)`, where `end` is the
/// stored `ends_at` or `starts_at + default_duration`.
#[must_use]
pub fn match_status(record: &Match, now: OffsetDateTime, default_duration: time::Duration) -> MatchStatus {
    if record.winner_id.is_some() {
        return MatchStatus::Past;
    }
    if now < record.starts_at {
        return MatchStatus::Upcoming;
    }
    let end = record.ends_at.unwrap_or(record.starts_at + default_duration);
    if now < end { MatchStatus::Ongoing } else { MatchStatus::Past }
}

// =============================================================================
// TYPES
// =============================================================================

/// Row of the `matches` table.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Match {
    pub id: Uuid,
    pub sport_id: Uuid,
    pub team1_id: Uuid,
    pub team2_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ends_at: Option<OffsetDateTime>,
    pub venue: Option<String>,
    pub round: Option<i32>,
    pub bracket_position: Option<i32>,
    pub team1_score: Option<i32>,
    pub team2_score: Option<i32>,
    pub winner_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
struct JoinedRow {
    #[sqlx(flatten)]
    record: Match,
    sport_name: String,
    team1_name: String,
    team2_name: String,
    winner_name: Option<String>,
}

/// A match as shown on the public site: names resolved, status computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchView {
    #[serde(flatten)]
    pub record: Match,
    pub sport_name: String,
    pub team1_name: String,
    pub team2_name: String,
    pub winner_name: Option<String>,
    pub status: MatchStatus,
}

impl JoinedRow {
    fn into_view(self, now: OffsetDateTime, default_duration: time::Duration) -> MatchView {
        let status = match_status(&self.record, now, default_duration);
        MatchView {
            record: self.record,
            sport_name: self.sport_name,
            team1_name: self.team1_name,
            team2_name: self.team2_name,
            winner_name: self.winner_name,
            status,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchFilter {
    pub sport_id: Option<Uuid>,
    /// Matches where this team plays on either side.
    pub team_id: Option<Uuid>,
    pub status: Option<MatchStatus>,
}

/// Create form as submitted. Timestamps arrive as text so a malformed value
/// can be reported against its field.
#[derive(Debug, Default, Deserialize)]
pub struct MatchDraft {
    pub sport_id: Option<Uuid>,
    pub team1_id: Option<Uuid>,
    pub team2_id: Option<Uuid>,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub venue: Option<String>,
    pub round: Option<i32>,
    pub bracket_position: Option<i32>,
    pub team1_score: Option<i32>,
    pub team2_score: Option<i32>,
    pub winner_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MatchPatch {
    pub sport_id: Option<Uuid>,
    pub team1_id: Option<Uuid>,
    pub team2_id: Option<Uuid>,
    pub starts_at: Option<String>,
    #[serde(default, deserialize_with = "validate::nullable")]
    pub ends_at: Option<Option<String>>,
    #[serde(default, deserialize_with = "validate::nullable")]
    pub venue: Option<Option<String>>,
    #[serde(default, deserialize_with = "validate::nullable")]
    pub round: Option<Option<i32>>,
    #[serde(default, deserialize_with = "validate::nullable")]
    pub bracket_position: Option<Option<i32>>,
    #[serde(default, deserialize_with = "validate::nullable")]
    pub team1_score: Option<Option<i32>>,
    #[serde(default, deserialize_with = "validate::nullable")]
    pub team2_score: Option<Option<i32>>,
    #[serde(default, deserialize_with = "validate::nullable")]
    pub winner_id: Option<Option<Uuid>>,
}

/// Validated column values ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFields {
    pub sport_id: Uuid,
    pub team1_id: Uuid,
    pub team2_id: Uuid,
    pub starts_at: OffsetDateTime,
    pub ends_at: Option<OffsetDateTime>,
    pub venue: Option<String>,
    pub round: Option<i32>,
    pub bracket_position: Option<i32>,
    pub team1_score: Option<i32>,
    pub team2_score: Option<i32>,
    pub winner_id: Option<Uuid>,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Parse an RFC 3339 timestamp, or a `datetime-local` form value
/// (`YYYY-MM-DDTHH:MM[:SS]`) taken as UTC.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming `field` when neither form parses.
pub fn parse_timestamp(field: &'static str, raw: &str) -> Result<OffsetDateTime, ValidationError> {
    let raw = raw.trim();
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(value);
    }
    let with_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let without_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    time::PrimitiveDateTime::parse(raw, with_seconds)
        .or_else(|_| time::PrimitiveDateTime::parse(raw, without_seconds))
        .map(time::PrimitiveDateTime::assume_utc)
        .map_err(|_| ValidationError::new(field, format!("{field} must be a date and time")))
}

fn parse_optional_timestamp(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<OffsetDateTime>, ValidationError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => parse_timestamp(field, value).map(Some),
        None => Ok(None),
    }
}

#[derive(Debug, Default)]
struct MatchInput {
    sport_id: Option<Uuid>,
    team1_id: Option<Uuid>,
    team2_id: Option<Uuid>,
    starts_at: Option<OffsetDateTime>,
    ends_at: Option<OffsetDateTime>,
    venue: Option<String>,
    round: Option<i32>,
    bracket_position: Option<i32>,
    team1_score: Option<i32>,
    team2_score: Option<i32>,
    winner_id: Option<Uuid>,
}

impl MatchInput {
    fn finish(self) -> Result<MatchFields, ValidationError> {
        let sport_id = validate::required("sport_id", self.sport_id)?;
        let team1_id = validate::required("team1_id", self.team1_id)?;
        let team2_id = validate::required("team2_id", self.team2_id)?;
        let starts_at = validate::required("starts_at", self.starts_at)?;

        if team1_id == team2_id {
            return Err(ValidationError::new("team2_id", "a team cannot play against itself"));
        }
        if let Some(ends_at) = self.ends_at
            && ends_at <= starts_at
        {
            return Err(ValidationError::new("ends_at", "ends_at must be after starts_at"));
        }
        if let Some(winner_id) = self.winner_id
            && winner_id != team1_id
            && winner_id != team2_id
        {
            return Err(ValidationError::new("winner_id", "winner must be one of the two teams"));
        }

        Ok(MatchFields {
            sport_id,
            team1_id,
            team2_id,
            starts_at,
            ends_at: self.ends_at,
            venue: validate::optional_text(self.venue.as_deref()),
            round: validate::positive("round", self.round)?,
            bracket_position: validate::positive("bracket_position", self.bracket_position)?,
            team1_score: validate::non_negative("team1_score", self.team1_score)?,
            team2_score: validate::non_negative("team2_score", self.team2_score)?,
            winner_id: self.winner_id,
        })
    }
}

impl MatchDraft {
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<MatchFields, ValidationError> {
        MatchInput {
            sport_id: self.sport_id,
            team1_id: self.team1_id,
            team2_id: self.team2_id,
            starts_at: parse_optional_timestamp("starts_at", self.starts_at.as_deref())?,
            ends_at: parse_optional_timestamp("ends_at", self.ends_at.as_deref())?,
            venue: self.venue.clone(),
            round: self.round,
            bracket_position: self.bracket_position,
            team1_score: self.team1_score,
            team2_score: self.team2_score,
            winner_id: self.winner_id,
        }
        .finish()
    }
}

impl Match {
    /// Merge a patch over this row and re-validate the result.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found in the merged row.
    pub fn apply(&self, patch: &MatchPatch) -> Result<MatchFields, ValidationError> {
        let starts_at = match patch.starts_at.as_deref() {
            Some(raw) => Some(parse_timestamp("starts_at", raw)?),
            None => Some(self.starts_at),
        };
        let ends_at = match &patch.ends_at {
            Some(raw) => parse_optional_timestamp("ends_at", raw.as_deref())?,
            None => self.ends_at,
        };

        MatchInput {
            sport_id: Some(validate::merge(self.sport_id, patch.sport_id)),
            team1_id: Some(validate::merge(self.team1_id, patch.team1_id)),
            team2_id: Some(validate::merge(self.team2_id, patch.team2_id)),
            starts_at,
            ends_at,
            venue: validate::merge(self.venue.clone(), patch.venue.clone()),
            round: validate::merge(self.round, patch.round),
            bracket_position: validate::merge(self.bracket_position, patch.bracket_position),
            team1_score: validate::merge(self.team1_score, patch.team1_score),
            team2_score: validate::merge(self.team2_score, patch.team2_score),
            winner_id: validate::merge(self.winner_id, patch.winner_id),
        }
        .finish()
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// Apply the status filter and order the list: chronological, except a
/// `past`-only list which shows the most recent result first.
#[must_use]
pub fn arrange(mut views: Vec<MatchView>, status: Option<MatchStatus>) -> Vec<MatchView> {
    if let Some(status) = status {
        views.retain(|view| view.status == status);
    }
    if status == Some(MatchStatus::Past) {
        views.sort_by_key(|view| (Reverse(view.record.starts_at), view.record.id));
    } else {
        views.sort_by_key(|view| (view.record.starts_at, view.record.id));
    }
    views
}

/// List matches with names joined and status computed.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list(
    pool: &PgPool,
    filter: &MatchFilter,
    now: OffsetDateTime,
    default_duration: time::Duration,
) -> Result<Vec<MatchView>, RecordError> {
    let mut builder = QueryBuilder::<Postgres>::new(SELECT_JOINED);
    builder.push(" WHERE TRUE");
    if let Some(sport_id) = filter.sport_id {
        builder.push(" AND m.sport_id = ");
        builder.push_bind(sport_id);
    }
    if let Some(team_id) = filter.team_id {
        builder.push(" AND (m.team1_id = ");
        builder.push_bind(team_id);
        builder.push(" OR m.team2_id = ");
        builder.push_bind(team_id);
        builder.push(")");
    }

    let rows = builder.build_query_as::<JoinedRow>().fetch_all(pool).await?;
    let views = rows
        .into_iter()
        .map(|row| row.into_view(now, default_duration))
        .collect();
    Ok(arrange(views, filter.status))
}

/// # Errors
///
/// Returns `NotFound` if no match has this id.
pub async fn get_view(
    pool: &PgPool,
    id: Uuid,
    now: OffsetDateTime,
    default_duration: time::Duration,
) -> Result<MatchView, RecordError> {
    let sql = format!("{SELECT_JOINED} WHERE m.id = $1");
    let row = sqlx::query_as::<_, JoinedRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(RecordError::not_found(TABLE, id))?;
    Ok(row.into_view(now, default_duration))
}

/// # Errors
///
/// Returns `NotFound` if no match has this id.
pub async fn get(pool: &PgPool, id: Uuid) -> Result<Match, RecordError> {
    sqlx::query_as::<_, Match>(
        "SELECT id, sport_id, team1_id, team2_id, starts_at, ends_at, venue, round, bracket_position, \
         team1_score, team2_score, winner_id, created_at FROM matches WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(RecordError::not_found(TABLE, id))
}

/// # Errors
///
/// Returns a validation error, `Conflict` for unknown sport/team ids, or a
/// database error.
pub async fn create(pool: &PgPool, draft: &MatchDraft) -> Result<Match, RecordError> {
    let fields = draft.validate()?;
    let sql = format!(
        "INSERT INTO matches (id, sport_id, team1_id, team2_id, starts_at, ends_at, venue, round, \
         bracket_position, team1_score, team2_score, winner_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) {RETURNING}"
    );
    let row = bind_fields(sqlx::query_as::<_, Match>(&sql).bind(Uuid::new_v4()), &fields)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

/// # Errors
///
/// Returns `NotFound`, a validation error, `Conflict`, or a database error.
pub async fn update(pool: &PgPool, id: Uuid, patch: &MatchPatch) -> Result<Match, RecordError> {
    let current = get(pool, id).await?;
    let fields = current.apply(patch)?;
    let sql = format!(
        "UPDATE matches SET sport_id = $2, team1_id = $3, team2_id = $4, starts_at = $5, ends_at = $6, \
         venue = $7, round = $8, bracket_position = $9, team1_score = $10, team2_score = $11, \
         winner_id = $12 WHERE id = $1 {RETURNING}"
    );
    bind_fields(sqlx::query_as::<_, Match>(&sql).bind(id), &fields)
        .fetch_optional(pool)
        .await?
        .ok_or(RecordError::not_found(TABLE, id))
}

fn bind_fields<'q>(
    query: sqlx::query::QueryAs<'q, Postgres, Match, sqlx::postgres::PgArguments>,
    fields: &'q MatchFields,
) -> sqlx::query::QueryAs<'q, Postgres, Match, sqlx::postgres::PgArguments> {
    query
        .bind(fields.sport_id)
        .bind(fields.team1_id)
        .bind(fields.team2_id)
        .bind(fields.starts_at)
        .bind(fields.ends_at)
        .bind(&fields.venue)
        .bind(fields.round)
        .bind(fields.bracket_position)
        .bind(fields.team1_score)
        .bind(fields.team2_score)
        .bind(fields.winner_id)
}

/// # Errors
///
/// Returns `NotFound` if nothing was deleted.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), RecordError> {
    let result = sqlx::query("DELETE FROM matches WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RecordError::not_found(TABLE, id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "matches_test.rs"]
mod tests;
