mod config;
mod db;
mod rate_limit;
mod routes;
mod services;
mod state;
mod validate;

use std::net::SocketAddr;
use std::sync::Arc;

use services::storage::{HttpImageStore, ImageStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::Config::from_env().expect("invalid configuration");
    let port = config.port;

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("database init failed");

    // Image storage is optional: without it uploads answer 503.
    let images: Option<Arc<dyn ImageStore>> = match config.storage.as_ref() {
        Some(storage) => match HttpImageStore::new(storage) {
            Ok(store) => {
                tracing::info!(bucket = %storage.bucket, "image storage configured");
                Some(Arc::new(store))
            }
            Err(e) => {
                tracing::warn!(error = %e, "image storage unavailable");
                None
            }
        },
        None => {
            tracing::warn!("STORAGE_URL/STORAGE_SERVICE_KEY not set; image uploads disabled");
            None
        }
    };
    if config.admin_password.is_none() {
        tracing::warn!("ADMIN_PASSWORD not set; admin login disabled");
    }

    let limiter = rate_limit::RateLimiter::new(rate_limit::RateLimitConfig::from_env());
    let state = state::AppState::new(pool, config, images, limiter);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "festival listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .expect("server failed");
}
