use super::*;

fn limiter(limit: usize, window_secs: u64) -> RateLimiter {
    RateLimiter::new(RateLimitConfig { limit, window: Duration::from_secs(window_secs) })
}

#[test]
fn unknown_key_is_allowed() {
    let rl = limiter(3, 60);
    assert!(rl.check("203.0.113.7").is_ok());
}

#[test]
fn locks_out_after_limit_failures() {
    let rl = limiter(3, 60);
    let now = Instant::now();
    for i in 0..3 {
        assert!(rl.check_at("a", now).is_ok(), "attempt {i} should be allowed");
        rl.record_failure_at("a", now);
    }
    assert_eq!(rl.check_at("a", now), Err(RateLimitError { limit: 3, window_secs: 60 }));
}

#[test]
fn keys_are_independent() {
    let rl = limiter(1, 60);
    let now = Instant::now();
    rl.record_failure_at("a", now);
    assert!(rl.check_at("a", now).is_err());
    assert!(rl.check_at("b", now).is_ok());
}

#[test]
fn window_expiry_allows_new_attempts() {
    let rl = limiter(2, 60);
    let start = Instant::now();
    rl.record_failure_at("a", start);
    rl.record_failure_at("a", start);
    assert!(rl.check_at("a", start).is_err());

    let later = start + Duration::from_secs(61);
    assert!(rl.check_at("a", later).is_ok());
}

#[test]
fn reset_clears_failures() {
    let rl = limiter(1, 60);
    rl.record_failure("a");
    assert!(rl.check("a").is_err());
    rl.reset("a");
    assert!(rl.check("a").is_ok());
}

#[test]
fn default_config_matches_documented_values() {
    let cfg = RateLimitConfig::default();
    assert_eq!(cfg.limit, 5);
    assert_eq!(cfg.window, Duration::from_secs(300));
}

#[test]
fn error_message_mentions_limit() {
    let err = RateLimitError { limit: 5, window_secs: 300 };
    assert_eq!(err.to_string(), "too many failed attempts (max 5 per 300s)");
}

#[test]
fn expired_keys_are_swept_on_next_failure() {
    let rl = limiter(5, 60);
    let start = Instant::now();
    for i in 0..50 {
        rl.record_failure_at(&format!("10.0.0.{i}"), start);
    }
    assert_eq!(rl.tracked_keys(), 50);

    let later = start + Duration::from_secs(61);
    rl.record_failure_at("192.0.2.1", later);
    assert_eq!(rl.tracked_keys(), 1);
}

#[test]
fn live_keys_survive_the_sweep() {
    let rl = limiter(2, 60);
    let start = Instant::now();
    rl.record_failure_at("a", start);
    rl.record_failure_at("b", start + Duration::from_secs(30));
    rl.record_failure_at("b", start + Duration::from_secs(61));
    assert_eq!(rl.tracked_keys(), 1);
    assert!(rl.check_at("b", start + Duration::from_secs(61)).is_err());
}
