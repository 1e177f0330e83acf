//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool, the parsed configuration, the optional image
//! store, and the login rate limiter. There is no other in-process state:
//! every read goes to the database.

use std::sync::Arc;

use sqlx::PgPool;
use time::OffsetDateTime;

use crate::config::Config;
use crate::rate_limit::RateLimiter;
use crate::services::storage::ImageStore;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// `None` if storage credentials are not configured.
    pub images: Option<Arc<dyn ImageStore>>,
    /// Failed admin logins per client.
    pub login_limiter: RateLimiter,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: Config, images: Option<Arc<dyn ImageStore>>, login_limiter: RateLimiter) -> Self {
        Self { pool, config: Arc::new(config), images, login_limiter }
    }

    /// Wall-clock time used for match status. A method so handlers read it
    /// in one place.
    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_has_admin_password_and_no_images() {
        let state = test_helpers::test_app_state();
        assert_eq!(state.config.admin_password.as_deref(), Some("festival-admin"));
        assert!(state.images.is_none());
    }

    #[tokio::test]
    async fn clones_share_config() {
        let state = test_helpers::test_app_state();
        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.config, &clone.config));
    }
}
