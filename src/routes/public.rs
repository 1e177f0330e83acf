//! Read-only routes backing the public site.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use super::error::ApiError;
use crate::services::bracket::{self, Bracket};
use crate::services::home::{self, HomeSummary};
use crate::services::matches::{self, MatchFilter, MatchView};
use crate::services::medals::{self, Medal, TallyRow};
use crate::services::news::{self, NewsPost};
use crate::services::rules::{self, Rule};
use crate::services::sports::{self, Sport};
use crate::services::teams::{self, Team, TeamDetail};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SportQuery {
    pub sport_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    pub limit: Option<i64>,
}

/// `GET /api/home` — landing page summary.
pub async fn home(State(state): State<AppState>) -> Result<Json<HomeSummary>, ApiError> {
    let summary = home::summary(&state.pool, state.now(), state.config.match_duration).await?;
    Ok(Json(summary))
}

/// `GET /api/matches` — schedule and results, optionally filtered.
pub async fn list_matches(
    State(state): State<AppState>,
    Query(filter): Query<MatchFilter>,
) -> Result<Json<Vec<MatchView>>, ApiError> {
    let rows = matches::list(&state.pool, &filter, state.now(), state.config.match_duration).await?;
    Ok(Json(rows))
}

/// `GET /api/matches/{id}`
pub async fn get_match(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<MatchView>, ApiError> {
    let view = matches::get_view(&state.pool, id, state.now(), state.config.match_duration).await?;
    Ok(Json(view))
}

/// `GET /api/sports`
pub async fn list_sports(State(state): State<AppState>) -> Result<Json<Vec<Sport>>, ApiError> {
    Ok(Json(sports::list(&state.pool).await?))
}

/// `GET /api/sports/{id}`
pub async fn get_sport(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Sport>, ApiError> {
    Ok(Json(sports::get(&state.pool, id).await?))
}

/// `GET /api/sports/{id}/bracket` — matches grouped by tournament round.
pub async fn sport_bracket(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Bracket>, ApiError> {
    let bracket = bracket::for_sport(&state.pool, id, state.now(), state.config.match_duration).await?;
    Ok(Json(bracket))
}

/// `GET /api/teams`
pub async fn list_teams(State(state): State<AppState>) -> Result<Json<Vec<Team>>, ApiError> {
    Ok(Json(teams::list(&state.pool).await?))
}

/// `GET /api/teams/{id}` — team with its matches and medal counts.
pub async fn get_team(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<TeamDetail>, ApiError> {
    let detail = teams::get_detail(&state.pool, id, state.now(), state.config.match_duration).await?;
    Ok(Json(detail))
}

/// `GET /api/medals`
pub async fn list_medals(
    State(state): State<AppState>,
    Query(query): Query<SportQuery>,
) -> Result<Json<Vec<Medal>>, ApiError> {
    Ok(Json(medals::list(&state.pool, query.sport_id).await?))
}

/// `GET /api/medals/tally` — ranked medal table, overall or for one sport.
pub async fn medal_tally(
    State(state): State<AppState>,
    Query(query): Query<SportQuery>,
) -> Result<Json<Vec<TallyRow>>, ApiError> {
    Ok(Json(medals::tally(&state.pool, query.sport_id).await?))
}

/// `GET /api/rules` — general rules plus, when given, one sport's rules.
pub async fn list_rules(
    State(state): State<AppState>,
    Query(query): Query<SportQuery>,
) -> Result<Json<Vec<Rule>>, ApiError> {
    Ok(Json(rules::list(&state.pool, query.sport_id).await?))
}

/// `GET /api/news` — newest first.
pub async fn list_news(
    State(state): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<Vec<NewsPost>>, ApiError> {
    Ok(Json(news::list(&state.pool, query.limit).await?))
}

/// `GET /api/news/{id}`
pub async fn get_news(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<NewsPost>, ApiError> {
    Ok(Json(news::get(&state.pool, id).await?))
}

#[cfg(test)]
#[path = "public_test.rs"]
mod tests;
