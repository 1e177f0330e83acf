use super::*;
use crate::state::test_helpers;
use axum::http::HeaderValue;

fn peer() -> SocketAddr {
    SocketAddr::from(([192, 0, 2, 10], 51000))
}

// =============================================================================
// token extraction
// =============================================================================

#[test]
fn session_token_prefers_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert("cookie", HeaderValue::from_static("admin_session=from-cookie; theme=dark"));
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
    assert_eq!(session_token(&headers).as_deref(), Some("from-cookie"));
}

#[test]
fn session_token_falls_back_to_bearer() {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
    assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
}

#[test]
fn session_token_ignores_other_schemes_and_blank() {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
    assert_eq!(session_token(&headers), None);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
    assert_eq!(session_token(&headers), None);

    let mut headers = HeaderMap::new();
    headers.insert("cookie", HeaderValue::from_static("admin_session="));
    assert_eq!(session_token(&headers), None);
}

#[test]
fn client_key_uses_first_forwarded_address_when_trusted() {
    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.5, 10.0.0.1"));
    assert_eq!(client_key(&headers, peer(), true), "203.0.113.5");
}

#[test]
fn client_key_ignores_forwarded_for_by_default() {
    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.5"));
    assert_eq!(client_key(&headers, peer(), false), "192.0.2.10");
}

#[test]
fn client_key_falls_back_to_peer_ip() {
    assert_eq!(client_key(&HeaderMap::new(), peer(), true), "192.0.2.10");
}

#[test]
fn session_cookie_is_http_only_and_scoped() {
    let cookie = session_cookie("tok".into(), true, time::Duration::hours(1));
    assert_eq!(cookie.name(), COOKIE_NAME);
    assert_eq!(cookie.value(), "tok");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.max_age(), Some(time::Duration::hours(1)));
}

// =============================================================================
// login handler
// =============================================================================

async fn attempt(state: &AppState, password: &str) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    login(
        State(state.clone()),
        ConnectInfo(peer()),
        HeaderMap::new(),
        Json(LoginBody { password: password.to_owned() }),
    )
    .await
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let state = test_helpers::test_app_state();
    let err = attempt(&state, "guess").await.err().expect("login should fail");
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    assert_eq!(err.message, "invalid password");
}

#[tokio::test]
async fn repeated_failures_are_rate_limited() {
    let state = test_helpers::test_app_state();
    for _ in 0..5 {
        let err = attempt(&state, "guess").await.err().expect("login should fail");
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
    let err = attempt(&state, "festival-admin").await.err().expect("locked out");
    assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn rotating_forwarded_for_does_not_escape_the_limit() {
    let state = test_helpers::test_app_state();
    let mut statuses = Vec::new();
    for i in 0..20 {
        let mut headers = HeaderMap::new();
        let forged = HeaderValue::from_str(&format!("10.0.0.{i}")).expect("valid header");
        headers.insert("x-forwarded-for", forged);
        let err = login(
            State(state.clone()),
            ConnectInfo(peer()),
            headers,
            Json(LoginBody { password: "guess".to_owned() }),
        )
        .await
        .err()
        .expect("login should fail");
        statuses.push(err.status);
    }
    assert!(statuses[..5].iter().all(|s| *s == StatusCode::UNAUTHORIZED));
    assert!(statuses[5..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn login_without_configured_password_is_unavailable() {
    let mut config = test_helpers::test_config();
    config.admin_password = None;
    let state = AppState::new(
        test_helpers::lazy_pool(),
        config,
        None,
        crate::rate_limit::RateLimiter::new(crate::rate_limit::RateLimitConfig::default()),
    );
    let err = attempt(&state, "anything").await.err().expect("login disabled");
    assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
}
