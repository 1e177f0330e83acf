//! Object storage client for the `images` bucket.
//!
//! ARCHITECTURE
//! ============
//! Admin forms upload logos, sport pictures and news images to the managed
//! object store and then save the returned public URL on the row. Route
//! handlers depend on the [`ImageStore`] trait so tests can swap in an
//! in-memory store; production uses [`HttpImageStore`], a thin wrapper over
//! the storage REST API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::config::StorageConfig;

const REQUEST_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Top-level folders an upload may target.
pub const FOLDERS: &[&str] = &["sports", "teams", "news", "rules", "misc"];

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unknown folder {0:?}")]
    InvalidFolder(String),
    #[error("unsupported image type {0:?}")]
    UnsupportedType(String),
    #[error("image body is empty")]
    Empty,
    #[error("image is {size} bytes; the limit is {max}")]
    TooLarge { size: usize, max: usize },
    #[error("invalid object path {0:?}")]
    InvalidPath(String),
    #[error("http client build failed: {0}")]
    HttpClientBuild(String),
    #[error("storage request failed: {0}")]
    Request(String),
    #[error("storage returned {status}: {body}")]
    Response { status: u16, body: String },
}

impl StorageError {
    /// Whether the caller sent something we refuse, as opposed to the
    /// storage service failing.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFolder(_) | Self::UnsupportedType(_) | Self::Empty | Self::TooLarge { .. } | Self::InvalidPath(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    /// Object key inside the bucket.
    pub path: String,
    pub url: String,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), StorageError>;
    async fn remove(&self, path: &str) -> Result<(), StorageError>;
    fn public_url(&self, path: &str) -> String;
}

// =============================================================================
// HTTP STORE
// =============================================================================

pub struct HttpImageStore {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl HttpImageStore {
    /// # Errors
    ///
    /// Returns `HttpClientBuild` if the reqwest client cannot be created.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| StorageError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            service_key: config.service_key.clone(),
            bucket: config.bucket.clone(),
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }

    async fn check(response: reqwest::Response) -> Result<(), StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response
            .text()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;
        Err(StorageError::Response { status: status.as_u16(), body })
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let response = self
            .http
            .post(self.object_url(path))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;
        Self::check(response).await
    }

    async fn remove(&self, path: &str) -> Result<(), StorageError> {
        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);
        let response = self
            .http
            .delete(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&serde_json::json!({ "prefixes": [path] }))
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;
        Self::check(response).await
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, self.bucket, path)
    }
}

// =============================================================================
// UPLOAD RULES
// =============================================================================

/// File extension for an accepted image content type. SVG is refused:
/// it can carry script and the bucket serves objects publicly.
#[must_use]
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match essence.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Accept only `folder/name` keys made of safe characters, inside a known folder.
///
/// # Errors
///
/// Returns `InvalidPath` for anything else.
pub fn check_object_path(path: &str) -> Result<(), StorageError> {
    let invalid = || StorageError::InvalidPath(path.to_owned());
    let (folder, name) = path.split_once('/').ok_or_else(invalid)?;
    let safe = |s: &str| {
        !s.is_empty()
            && !s.starts_with('.')
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    if !FOLDERS.contains(&folder) || !safe(name) {
        return Err(invalid());
    }
    Ok(())
}

/// Validate and upload one image, returning its key and public URL.
///
/// # Errors
///
/// Returns a client error for a bad folder, type, or size, or the store's
/// error if the upload fails.
pub async fn store_image(
    store: &dyn ImageStore,
    folder: &str,
    content_type: &str,
    bytes: Vec<u8>,
    max_bytes: usize,
) -> Result<StoredImage, StorageError> {
    let folder = folder.trim().to_ascii_lowercase();
    if !FOLDERS.contains(&folder.as_str()) {
        return Err(StorageError::InvalidFolder(folder));
    }
    let ext = extension_for(content_type).ok_or_else(|| StorageError::UnsupportedType(content_type.to_owned()))?;
    if bytes.is_empty() {
        return Err(StorageError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(StorageError::TooLarge { size: bytes.len(), max: max_bytes });
    }

    let path = format!("{folder}/{}.{ext}", Uuid::new_v4());
    store.upload(&path, content_type, bytes).await?;
    tracing::info!(%path, "image uploaded");
    Ok(StoredImage { url: store.public_url(&path), path })
}

/// # Errors
///
/// Returns `InvalidPath` for a key outside the known folders, or the store's
/// error if the delete fails.
pub async fn remove_image(store: &dyn ImageStore, path: &str) -> Result<(), StorageError> {
    check_object_path(path)?;
    store.remove(path).await?;
    tracing::info!(%path, "image removed");
    Ok(())
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
