//! Token bucket rate limiter for the unauthenticated auth endpoints.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use moka::future::Cache;
use tokio::sync::Mutex;
use tracing::warn;

use hrdesk_core::config::RateLimitConfig;
use hrdesk_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Upper bound on how long an idle bucket is remembered.
const MAX_IDLE: Duration = Duration::from_secs(6 * 60 * 60);

/// In-memory token bucket rate limiter.
///
/// Buckets live in a moka cache and are dropped once a client has been idle
/// long enough for its bucket to refill completely, so the map stays bounded
/// by the number of recently active clients.
#[derive(Clone)]
pub struct RateLimiter {
    /// Client key → bucket state.
    buckets: Cache<String, Arc<Mutex<TokenBucket>>>,
    /// Maximum tokens per bucket.
    max_tokens: u32,
    /// Token refill rate per second.
    refill_rate: f64,
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("clients", &self.buckets.entry_count())
            .field("max_tokens", &self.max_tokens)
            .field("refill_rate", &self.refill_rate)
            .finish()
    }
}

impl RateLimiter {
    /// Creates a new rate limiter.
    pub fn new(max_tokens: u32, refill_rate: f64) -> Self {
        Self {
            buckets: Cache::builder()
                .time_to_idle(idle_window(max_tokens, refill_rate))
                .build(),
            max_tokens,
            refill_rate,
        }
    }

    /// Attempts to consume a token for the given key.
    pub async fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> bool {
        let max_tokens = f64::from(self.max_tokens);
        let bucket = self
            .buckets
            .get_with(key.to_string(), async move {
                Arc::new(Mutex::new(TokenBucket {
                    tokens: max_tokens,
                    last_refill: now,
                }))
            })
            .await;
        let mut bucket = bucket.lock().await;

        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_rate).min(max_tokens);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Time for an empty bucket to refill completely. A bucket idle for longer
/// is indistinguishable from a fresh one.
fn idle_window(max_tokens: u32, refill_rate: f64) -> Duration {
    if refill_rate <= 0.0 {
        return MAX_IDLE;
    }
    let secs = (f64::from(max_tokens) / refill_rate).ceil();
    Duration::from_secs_f64(secs.max(1.0)).min(MAX_IDLE)
}

/// Client key. The peer address is used unless the server sits behind a
/// trusted proxy, in which case the last `X-Forwarded-For` hop (the one the
/// proxy appended) identifies the client.
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, config: &RateLimitConfig) -> String {
    let forwarded = config
        .trust_forwarded_for
        .then(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.rsplit(',').next())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
        .flatten();

    forwarded
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rejects a request with `429 RATE_LIMITED` once the client's bucket is empty.
pub async fn limit_auth_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.rate_limit.enabled {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer, &state.config.rate_limit);

    if !state.rate_limiter.check(&key).await {
        warn!(client = %key, path = %request.uri().path(), "Auth rate limit exceeded");
        return ApiError(AppError::rate_limit(
            "Too many attempts. Please wait a moment and try again.",
        ))
        .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bucket_drains_and_refills() {
        let limiter = RateLimiter::new(2, 1.0);
        let start = Instant::now();

        assert!(limiter.check_at("10.0.0.1", start).await);
        assert!(limiter.check_at("10.0.0.1", start).await);
        assert!(!limiter.check_at("10.0.0.1", start).await);
        // Separate clients have separate buckets.
        assert!(limiter.check_at("10.0.0.2", start).await);

        assert!(limiter.check_at("10.0.0.1", start + Duration::from_secs(1)).await);
    }

    #[test]
    fn test_forwarded_header_ignored_unless_trusted() {
        let mut headers = HeaderMap::new();
        let peer: SocketAddr = "192.168.1.7:5000".parse().unwrap();
        let direct = RateLimitConfig::default();
        assert!(!direct.trust_forwarded_for);

        assert_eq!(client_key(&headers, Some(peer), &direct), "192.168.1.7");
        assert_eq!(client_key(&headers, None, &direct), "unknown");

        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        assert_eq!(client_key(&headers, Some(peer), &direct), "192.168.1.7");

        let proxied = RateLimitConfig {
            trust_forwarded_for: true,
            ..RateLimitConfig::default()
        };
        assert_eq!(client_key(&headers, Some(peer), &proxied), "10.0.0.1");
    }

    #[test]
    fn test_idle_window_covers_a_full_refill() {
        assert_eq!(idle_window(10, 0.2), Duration::from_secs(50));
        assert_eq!(idle_window(10, 100.0), Duration::from_secs(1));
        assert_eq!(idle_window(10, 0.0), MAX_IDLE);
        assert_eq!(idle_window(10, 0.000_001), MAX_IDLE);
    }
}
