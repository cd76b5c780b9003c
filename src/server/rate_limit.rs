//! Fixed-window rate limiting per client IP

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::client_ip;
use crate::config::RateLimitConfig;

/// Windows kept before expired ones are swept, at most once per window
const SWEEP_THRESHOLD: usize = 10_000;

const RATELIMIT_LIMIT: &str = "ratelimit-limit";
const RATELIMIT_REMAINING: &str = "ratelimit-remaining";
const RATELIMIT_RESET: &str = "ratelimit-reset";

struct Window {
    started: Instant,
    count: u32,
}

struct Clients {
    windows: HashMap<String, Window>,
    last_sweep: Instant,
}

/// Outcome of counting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

impl RateDecision {
    fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(HeaderName::from_static(RATELIMIT_LIMIT), HeaderValue::from(self.limit));
        headers.insert(HeaderName::from_static(RATELIMIT_REMAINING), HeaderValue::from(self.remaining));
        headers.insert(
            HeaderName::from_static(RATELIMIT_RESET),
            HeaderValue::from(self.reset_after.as_secs()),
        );
    }
}

pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    clients: Mutex<Clients>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            window: Duration::from_secs(config.window_secs.max(1)),
            max_requests: config.max_requests,
            clients: Mutex::new(Clients {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Count a request from `client` and decide whether it may proceed
    pub fn check(&self, client: &str) -> RateDecision {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> RateDecision {
        let mut clients = self.clients.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let window = self.window;
        if clients.windows.len() >= SWEEP_THRESHOLD
            && now.saturating_duration_since(clients.last_sweep) >= window
        {
            clients
                .windows
                .retain(|_, w| now.saturating_duration_since(w.started) < window);
            clients.last_sweep = now;
        }

        let entry = clients.windows.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.saturating_duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        let allowed = entry.count < self.max_requests;
        if allowed {
            entry.count += 1;
        }

        RateDecision {
            allowed,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(entry.count),
            reset_after: self
                .window
                .saturating_sub(now.saturating_duration_since(entry.started)),
        }
    }

    /// Message sent with 429 responses
    pub fn rejection_message(&self) -> String {
        let minutes = self.window.as_secs().div_ceil(60).max(1);
        let unit = if minutes == 1 { "minute" } else { "minutes" };
        format!(
            "Too many requests from this IP, please try again after {} {}.",
            minutes, unit
        )
    }
}

/// Middleware rejecting clients over their quota with 429
pub async fn enforce(State(limiter): State<Arc<RateLimiter>>, request: Request, next: Next) -> Response {
    let client = client_ip(&request);
    let decision = limiter.check(&client);

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        log::warn!("Rate limit exceeded for {}", client);
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "message": limiter.rejection_message() })),
        )
            .into_response()
    };

    decision.apply_headers(response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(window_secs: u64, max_requests: u32) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            window_secs,
            max_requests,
        })
    }

    #[test]
    fn test_blocks_after_max_requests() {
        let limiter = limiter(900, 3);
        let start = Instant::now();

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check_at("1.2.3.4", start);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let blocked = limiter.check_at("1.2.3.4", start + Duration::from_secs(10));
        assert!(!blocked.allowed);
        assert_eq!(blocked.remaining, 0);
        assert_eq!(blocked.reset_after, Duration::from_secs(890));

        assert!(limiter.check_at("5.6.7.8", start).allowed);
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter(60, 1);
        let start = Instant::now();

        assert!(limiter.check_at("client", start).allowed);
        assert!(!limiter.check_at("client", start + Duration::from_secs(59)).allowed);
        assert!(limiter.check_at("client", start + Duration::from_secs(60)).allowed);
    }

    #[test]
    fn test_expired_windows_swept_once_per_window() {
        let limiter = limiter(60, 5);
        let start = Instant::now();

        for i in 0..SWEEP_THRESHOLD {
            limiter.check_at(&format!("10.0.{}.{}", i / 256, i % 256), start);
        }

        // Over the threshold but the last sweep is recent: nothing is dropped
        limiter.check_at("late", start + Duration::from_secs(1));
        assert_eq!(limiter.clients.lock().unwrap().windows.len(), SWEEP_THRESHOLD + 1);

        limiter.check_at("later", start + Duration::from_secs(60));
        let clients = limiter.clients.lock().unwrap();
        assert_eq!(clients.windows.len(), 2);
        assert!(clients.windows.contains_key("late"));
        assert!(clients.windows.contains_key("later"));
    }

    #[test]
    fn test_rejection_message() {
        assert_eq!(
            limiter(900, 100).rejection_message(),
            "Too many requests from this IP, please try again after 15 minutes."
        );
        assert_eq!(
            limiter(30, 100).rejection_message(),
            "Too many requests from this IP, please try again after 1 minute."
        );
    }

    #[test]
    fn test_headers() {
        let decision = RateDecision {
            allowed: true,
            limit: 100,
            remaining: 42,
            reset_after: Duration::from_secs(120),
        };
        let mut headers = HeaderMap::new();
        decision.apply_headers(&mut headers);
        assert_eq!(headers["ratelimit-limit"], "100");
        assert_eq!(headers["ratelimit-remaining"], "42");
        assert_eq!(headers["ratelimit-reset"], "120");
    }
}
