//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Public reads live under `/api`, the back office under `/api/admin`. When a
//! website directory is configured, the built front end is served as static
//! files for every other path.

pub mod admin;
pub mod auth;
pub mod error;
pub mod images;
pub mod public;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Room for request framing on top of the image itself.
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/home", get(public::home))
        .route("/api/matches", get(public::list_matches))
        .route("/api/matches/{id}", get(public::get_match))
        .route("/api/sports", get(public::list_sports))
        .route("/api/sports/{id}", get(public::get_sport))
        .route("/api/sports/{id}/bracket", get(public::sport_bracket))
        .route("/api/teams", get(public::list_teams))
        .route("/api/teams/{id}", get(public::get_team))
        .route("/api/medals", get(public::list_medals))
        .route("/api/medals/tally", get(public::medal_tally))
        .route("/api/rules", get(public::list_rules))
        .route("/api/news", get(public::list_news))
        .route("/api/news/{id}", get(public::get_news))
        .route("/healthz", get(healthz))
}

fn admin_routes(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/api/admin/login", post(auth::login))
        .route("/api/admin/logout", post(auth::logout))
        .route("/api/admin/me", get(auth::me))
        .route("/api/admin/sports", post(admin::create_sport))
        .route("/api/admin/sports/{id}", patch(admin::update_sport).delete(admin::delete_sport))
        .route("/api/admin/teams", post(admin::create_team))
        .route("/api/admin/teams/{id}", patch(admin::update_team).delete(admin::delete_team))
        .route("/api/admin/matches", post(admin::create_match))
        .route("/api/admin/matches/{id}", patch(admin::update_match).delete(admin::delete_match))
        .route("/api/admin/medals", post(admin::create_medal))
        .route("/api/admin/medals/{id}", patch(admin::update_medal).delete(admin::delete_medal))
        .route("/api/admin/rules", post(admin::create_rule))
        .route("/api/admin/rules/{id}", patch(admin::update_rule).delete(admin::delete_rule))
        .route("/api/admin/news", post(admin::create_news))
        .route("/api/admin/news/{id}", patch(admin::update_news).delete(admin::delete_news))
        .route(
            "/api/admin/images",
            post(images::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/admin/images/{*path}", delete(images::delete_image))
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = images::max_image_bytes(&state) + UPLOAD_OVERHEAD_BYTES;
    let website_dir = state.config.website_dir.clone();

    let router = public_routes()
        .merge(admin_routes(upload_limit))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match website_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "serving website files");
            router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
        }
        None => router,
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
