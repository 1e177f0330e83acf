//! Admin session management.
//!
//! ARCHITECTURE
//! ============
//! The back office has a single shared admin password. A successful login
//! mints a random token that is handed to the browser in an HttpOnly
//! cookie; only its SHA-256 digest is stored in `admin_sessions`, so a
//! leaked table dump cannot be replayed as a cookie.
//!
//! TRADE-OFFS
//! ==========
//! Expired rows are purged opportunistically on each login rather than by
//! a background task, which keeps the service free of timers.

use std::fmt::Write;

use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use time::OffsetDateTime;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("admin login is not configured")]
    Disabled,
    #[error("invalid password")]
    InvalidPassword,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Hex SHA-256 digest of a token, as stored in the database.
#[must_use]
pub fn hash_token(token: &str) -> String {
    bytes_to_hex(&Sha256::digest(token.as_bytes()))
}

/// Compare a submitted password against the configured one. Both sides are
/// hashed first so the comparison runs over equal-length digests.
#[must_use]
pub fn password_matches(expected: &str, submitted: &str) -> bool {
    let expected = Sha256::digest(expected.as_bytes());
    let submitted = Sha256::digest(submitted.as_bytes());
    expected
        .iter()
        .zip(submitted.iter())
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminSession {
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// Check the password and open a session, returning the raw token.
///
/// # Errors
///
/// Returns `Disabled` without a configured password, `InvalidPassword` on
/// mismatch, or a database error.
pub async fn login(
    pool: &PgPool,
    configured: Option<&str>,
    submitted: &str,
    now: OffsetDateTime,
    ttl: time::Duration,
) -> Result<(String, AdminSession), SessionError> {
    let expected = configured.ok_or(SessionError::Disabled)?;
    if !password_matches(expected, submitted) {
        return Err(SessionError::InvalidPassword);
    }

    let purged = sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= $1")
        .bind(now)
        .execute(pool)
        .await?
        .rows_affected();
    if purged > 0 {
        tracing::debug!(purged, "expired admin sessions removed");
    }

    let token = generate_token();
    let session = AdminSession { created_at: now, expires_at: now + ttl };
    sqlx::query("INSERT INTO admin_sessions (token_hash, created_at, expires_at) VALUES ($1, $2, $3)")
        .bind(hash_token(&token))
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(pool)
        .await?;
    Ok((token, session))
}

/// Look up an unexpired session for a raw token.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn validate(pool: &PgPool, token: &str, now: OffsetDateTime) -> Result<Option<AdminSession>, sqlx::Error> {
    let row = sqlx::query_as::<_, (OffsetDateTime, OffsetDateTime)>(
        "SELECT created_at, expires_at FROM admin_sessions WHERE token_hash = $1 AND expires_at > $2",
    )
    .bind(hash_token(token))
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(created_at, expires_at)| AdminSession { created_at, expires_at }))
}

/// # Errors
///
/// Returns a database error if the delete fails.
pub async fn revoke(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM admin_sessions WHERE token_hash = $1")
        .bind(hash_token(token))
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
