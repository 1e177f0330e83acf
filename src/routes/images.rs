//! Admin image upload and delete, backed by the storage bucket.
//!
//! Uploads take the raw file as the request body with its `Content-Type`
//! header, and the destination folder as `?folder=`. The response carries
//! the public URL to save on the sport, team, news, or rule row.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use serde::Deserialize;

use super::auth::AdminUser;
use super::error::ApiError;
use crate::config::DEFAULT_MAX_IMAGE_BYTES;
use crate::services::storage::{self, ImageStore, StoredImage};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default = "default_folder")]
    pub folder: String,
}

fn default_folder() -> String {
    "misc".to_owned()
}

fn image_store(state: &AppState) -> Result<Arc<dyn ImageStore>, ApiError> {
    state.images.clone().ok_or_else(|| ApiError::unavailable("image storage"))
}

/// Largest accepted upload.
pub(crate) fn max_image_bytes(state: &AppState) -> usize {
    state
        .config
        .storage
        .as_ref()
        .map_or(DEFAULT_MAX_IMAGE_BYTES, |storage| storage.max_image_bytes)
}

/// `POST /api/admin/images?folder=teams`
pub async fn upload_image(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<StoredImage>), ApiError> {
    let store = image_store(&state)?;
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let stored = storage::store_image(
        store.as_ref(),
        &query.folder,
        content_type,
        body.to_vec(),
        max_image_bytes(&state),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// `DELETE /api/admin/images/{*path}`
pub async fn delete_image(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(path): Path<String>,
) -> Result<StatusCode, ApiError> {
    let store = image_store(&state)?;
    storage::remove_image(store.as_ref(), &path).await?;
    Ok(StatusCode::NO_CONTENT)
}
