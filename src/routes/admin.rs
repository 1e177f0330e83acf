//! Back-office CRUD routes. Every handler requires an [`AdminUser`].

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use uuid::Uuid;

use super::auth::AdminUser;
use super::error::ApiError;
use crate::services::matches::{self, Match, MatchDraft, MatchPatch};
use crate::services::medals::{self, Medal, MedalDraft, MedalPatch};
use crate::services::news::{self, NewsDraft, NewsPatch, NewsPost};
use crate::services::rules::{self, Rule, RuleDraft, RulePatch};
use crate::services::sports::{self, Sport, SportDraft, SportPatch};
use crate::services::teams::{self, Team, TeamDraft, TeamPatch};
use crate::state::AppState;

type Created<T> = (StatusCode, Json<T>);

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Deleted {
    pub id: Uuid,
    pub deleted: bool,
}

fn deleted(table: &'static str, id: Uuid) -> Json<Deleted> {
    tracing::info!(table, %id, "admin deleted row");
    Json(Deleted { id, deleted: true })
}

// =============================================================================
// SPORTS
// =============================================================================

/// `POST /api/admin/sports`
pub async fn create_sport(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(draft): Json<SportDraft>,
) -> Result<Created<Sport>, ApiError> {
    let row = sports::create(&state.pool, &draft).await?;
    tracing::info!(id = %row.id, name = %row.name, "sport created");
    Ok((StatusCode::CREATED, Json(row)))
}

/// `PATCH /api/admin/sports/{id}`
pub async fn update_sport(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<SportPatch>,
) -> Result<Json<Sport>, ApiError> {
    Ok(Json(sports::update(&state.pool, id, &patch).await?))
}

/// `DELETE /api/admin/sports/{id}` — refused while matches reference it.
pub async fn delete_sport(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, ApiError> {
    sports::delete(&state.pool, id).await?;
    Ok(deleted("sports", id))
}

// =============================================================================
// TEAMS
// =============================================================================

/// `POST /api/admin/teams`
pub async fn create_team(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(draft): Json<TeamDraft>,
) -> Result<Created<Team>, ApiError> {
    let row = teams::create(&state.pool, &draft).await?;
    tracing::info!(id = %row.id, name = %row.name, "team created");
    Ok((StatusCode::CREATED, Json(row)))
}

/// `PATCH /api/admin/teams/{id}`
pub async fn update_team(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<TeamPatch>,
) -> Result<Json<Team>, ApiError> {
    Ok(Json(teams::update(&state.pool, id, &patch).await?))
}

/// `DELETE /api/admin/teams/{id}` — refused while matches reference it.
pub async fn delete_team(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, ApiError> {
    teams::delete(&state.pool, id).await?;
    Ok(deleted("teams", id))
}

// =============================================================================
// MATCHES
// =============================================================================

/// `POST /api/admin/matches`
pub async fn create_match(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(draft): Json<MatchDraft>,
) -> Result<Created<Match>, ApiError> {
    let row = matches::create(&state.pool, &draft).await?;
    tracing::info!(id = %row.id, sport_id = %row.sport_id, "match created");
    Ok((StatusCode::CREATED, Json(row)))
}

/// `PATCH /api/admin/matches/{id}` — also used to record scores and winner.
pub async fn update_match(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<MatchPatch>,
) -> Result<Json<Match>, ApiError> {
    Ok(Json(matches::update(&state.pool, id, &patch).await?))
}

/// `DELETE /api/admin/matches/{id}`
pub async fn delete_match(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, ApiError> {
    matches::delete(&state.pool, id).await?;
    Ok(deleted("matches", id))
}

// =============================================================================
// MEDALS
// =============================================================================

/// `POST /api/admin/medals`
pub async fn create_medal(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(draft): Json<MedalDraft>,
) -> Result<Created<Medal>, ApiError> {
    let row = medals::create(&state.pool, &draft).await?;
    tracing::info!(id = %row.id, team_id = %row.team_id, medal = %row.medal, "medal awarded");
    Ok((StatusCode::CREATED, Json(row)))
}

/// `PATCH /api/admin/medals/{id}`
pub async fn update_medal(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<MedalPatch>,
) -> Result<Json<Medal>, ApiError> {
    Ok(Json(medals::update(&state.pool, id, &patch).await?))
}

/// `DELETE /api/admin/medals/{id}`
pub async fn delete_medal(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, ApiError> {
    medals::delete(&state.pool, id).await?;
    Ok(deleted("medals", id))
}

// =============================================================================
// RULES
// =============================================================================

/// `POST /api/admin/rules`
pub async fn create_rule(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(draft): Json<RuleDraft>,
) -> Result<Created<Rule>, ApiError> {
    let row = rules::create(&state.pool, &draft).await?;
    tracing::info!(id = %row.id, title = %row.title, "rule created");
    Ok((StatusCode::CREATED, Json(row)))
}

/// `PATCH /api/admin/rules/{id}`
pub async fn update_rule(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<RulePatch>,
) -> Result<Json<Rule>, ApiError> {
    Ok(Json(rules::update(&state.pool, id, &patch).await?))
}

/// `DELETE /api/admin/rules/{id}`
pub async fn delete_rule(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, ApiError> {
    rules::delete(&state.pool, id).await?;
    Ok(deleted("rules", id))
}

// =============================================================================
// NEWS
// =============================================================================

/// `POST /api/admin/news` — `published_at` defaults to now.
pub async fn create_news(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(draft): Json<NewsDraft>,
) -> Result<Created<NewsPost>, ApiError> {
    let row = news::create(&state.pool, &draft, state.now()).await?;
    tracing::info!(id = %row.id, title = %row.title, "news posted");
    Ok((StatusCode::CREATED, Json(row)))
}

/// `PATCH /api/admin/news/{id}`
pub async fn update_news(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<NewsPatch>,
) -> Result<Json<NewsPost>, ApiError> {
    Ok(Json(news::update(&state.pool, id, &patch).await?))
}

/// `DELETE /api/admin/news/{id}`
pub async fn delete_news(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, ApiError> {
    news::delete(&state.pool, id).await?;
    Ok(deleted("news", id))
}
