//! Front-page summary assembled from the other services.

use serde::Serialize;
use sqlx::PgPool;
use time::OffsetDateTime;

use super::error::RecordError;
use super::matches::{self, MatchFilter, MatchStatus, MatchView};
use super::medals::{self, TallyRow};
use super::news::{self, NewsPost};

pub const UPCOMING_LIMIT: usize = 5;
pub const RESULTS_LIMIT: usize = 5;
pub const NEWS_LIMIT: i64 = 3;
pub const LEADERS_LIMIT: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct HomeSummary {
    pub ongoing: Vec<MatchView>,
    pub upcoming: Vec<MatchView>,
    pub recent_results: Vec<MatchView>,
    pub news: Vec<NewsPost>,
    pub leaders: Vec<TallyRow>,
}

/// Split a chronologically ordered match list into the three front-page
/// buckets. Results are most recent first.
#[must_use]
pub fn bucket_matches(views: Vec<MatchView>) -> (Vec<MatchView>, Vec<MatchView>, Vec<MatchView>) {
    let mut ongoing = Vec::new();
    let mut upcoming = Vec::new();
    let mut past = Vec::new();
    for view in views {
        match view.status {
            MatchStatus::Ongoing => ongoing.push(view),
            MatchStatus::Upcoming => upcoming.push(view),
            MatchStatus::Past => past.push(view),
        }
    }
    upcoming.truncate(UPCOMING_LIMIT);
    let past = matches::arrange(past, Some(MatchStatus::Past));
    let recent = past.into_iter().take(RESULTS_LIMIT).collect();
    (ongoing, upcoming, recent)
}

/// # Errors
///
/// Returns a database error if any underlying query fails.
pub async fn summary(
    pool: &PgPool,
    now: OffsetDateTime,
    match_duration: time::Duration,
) -> Result<HomeSummary, RecordError> {
    let all = matches::list(pool, &MatchFilter::default(), now, match_duration).await?;
    let (ongoing, upcoming, recent_results) = bucket_matches(all);
    let news = news::list(pool, Some(NEWS_LIMIT)).await?;
    let mut leaders = medals::tally(pool, None).await?;
    leaders.truncate(LEADERS_LIMIT);
    Ok(HomeSummary { ongoing, upcoming, recent_results, news, leaders })
}

#[cfg(test)]
#[path = "home_test.rs"]
mod tests;
