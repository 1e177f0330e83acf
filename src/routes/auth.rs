//! Admin auth routes — password login, logout, and the session extractor.

use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, FromRef, State};
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::error::ApiError;
use crate::services::session::{self, AdminSession, SessionError};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "admin_session";

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated admin, taken from the `admin_session` cookie or an
/// `Authorization: Bearer` header. Use as a handler parameter to require
/// the back-office login.
pub struct AdminUser {
    pub session: AdminSession,
    pub token: String,
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub(crate) fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(COOKIE_NAME)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_owned());
    }
    bearer_token(headers).map(str::to_owned)
}

impl<S> axum::extract::FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or_else(ApiError::unauthorized)?;
        let app_state = AppState::from_ref(state);
        let session = session::validate(&app_state.pool, &token, app_state.now())
            .await?
            .ok_or_else(ApiError::unauthorized)?;
        Ok(Self { session, token })
    }
}

/// Key used to rate-limit failed logins. The first `X-Forwarded-For`
/// address is used only when `trust_forwarded_for` is set; any client can
/// forge that header, so by default the peer address decides.
pub(crate) fn client_key(headers: &HeaderMap, peer: SocketAddr, trust_forwarded_for: bool) -> String {
    if !trust_forwarded_for {
        return peer.ip().to_string();
    }
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| peer.ip().to_string(), str::to_owned)
}

fn session_cookie(token: String, secure: bool, max_age: time::Duration) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct LoginBody {
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    /// Also usable as a bearer token by scripts.
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// `POST /api/admin/login` — check the admin password and open a session.
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<LoginBody>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let key = client_key(&headers, peer, state.config.trust_forwarded_for);
    state.login_limiter.check(&key)?;

    let result = session::login(
        &state.pool,
        state.config.admin_password.as_deref(),
        &body.password,
        state.now(),
        state.config.session_ttl,
    )
    .await;

    match result {
        Ok((token, admin)) => {
            state.login_limiter.reset(&key);
            tracing::info!(client = %key, "admin login");
            let cookie = session_cookie(token.clone(), state.config.cookie_secure, state.config.session_ttl);
            let jar = CookieJar::new().add(cookie);
            Ok((jar, Json(LoginResponse { token, expires_at: admin.expires_at })))
        }
        Err(SessionError::InvalidPassword) => {
            state.login_limiter.record_failure(&key);
            tracing::warn!(client = %key, "admin login rejected");
            Err(SessionError::InvalidPassword.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// `GET /api/admin/me` — return the current session.
pub async fn me(admin: AdminUser) -> Json<AdminSession> {
    Json(admin.session)
}

/// `POST /api/admin/logout` — delete the session and clear the cookie.
pub async fn logout(State(state): State<AppState>, admin: AdminUser) -> Result<impl IntoResponse, ApiError> {
    session::revoke(&state.pool, &admin.token).await?;
    let cookie = session_cookie(String::new(), state.config.cookie_secure, time::Duration::ZERO);
    let jar = CookieJar::new().add(cookie);
    Ok((jar, StatusCode::NO_CONTENT))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
