//! Elimination bracket data for a sport.
//!
//! The browser hands this structure to a charting component; this module
//! only groups and orders. Matches without a `round` are ordinary fixtures
//! and stay out of the bracket.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::RecordError;
use super::matches::{self, MatchFilter, MatchView};
use super::sports::{self, Sport};

#[derive(Debug, Clone, Serialize)]
pub struct BracketRound {
    pub round: i32,
    pub title: String,
    pub matches: Vec<MatchView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Bracket {
    pub sport: Sport,
    pub rounds: Vec<BracketRound>,
}

/// Title for `round` when `last` is the final round number.
#[must_use]
pub fn round_title(round: i32, last: i32) -> String {
    match last - round {
        0 => "Final".to_owned(),
        1 => "Semifinals".to_owned(),
        2 => "Quarterfinals".to_owned(),
        _ => format!("Round {round}"),
    }
}

/// Group bracket matches by round, rounds ascending, and within a round by
/// bracket position then start time.
#[must_use]
pub fn build_rounds(views: Vec<MatchView>) -> Vec<BracketRound> {
    let mut by_round: BTreeMap<i32, Vec<MatchView>> = BTreeMap::new();
    for view in views {
        if let Some(round) = view.record.round {
            by_round.entry(round).or_default().push(view);
        }
    }

    let Some(&last) = by_round.keys().next_back() else {
        return Vec::new();
    };

    by_round
        .into_iter()
        .map(|(round, mut matches)| {
            matches.sort_by_key(|m| {
                (
                    m.record.bracket_position.unwrap_or(i32::MAX),
                    m.record.starts_at,
                    m.record.id,
                )
            });
            BracketRound { round, title: round_title(round, last), matches }
        })
        .collect()
}

/// # Errors
///
/// Returns `NotFound` for an unknown sport, or a database error.
pub async fn for_sport(
    pool: &PgPool,
    sport_id: Uuid,
    now: OffsetDateTime,
    match_duration: time::Duration,
) -> Result<Bracket, RecordError> {
    let sport = sports::get(pool, sport_id).await?;
    let filter = MatchFilter { sport_id: Some(sport_id), ..MatchFilter::default() };
    let views = matches::list(pool, &filter, now, match_duration).await?;
    Ok(Bracket { sport, rounds: build_rounds(views) })
}

#[cfg(test)]
#[path = "bracket_test.rs"]
mod tests;
