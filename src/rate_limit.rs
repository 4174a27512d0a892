use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::AppError;
use crate::AppState;

/// Fixed-window request counter keyed by client.
///
/// A window opens on the first request from a key and lasts `per`. The first
/// request at or after `window_start + per` opens a new window, so bursts
/// straddling a boundary are not smoothed. State lives in this process only.
#[derive(Clone)]
pub struct RateLimiter {
    limit: u32,
    per: Duration,
    entries: Arc<Mutex<HashMap<String, WindowEntry>>>,
}

struct WindowEntry {
    window_start: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(limit: u32, per: Duration) -> Self {
        Self {
            limit,
            per,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn window(&self) -> Duration {
        self.per
    }

    /// Records a request for `key`. Returns Ok(remaining) or Err(retry_after).
    pub async fn check(&self, key: &str) -> Result<u32, Duration> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let Some(entry) = entries.get_mut(key) else {
            entries.insert(
                key.to_string(),
                WindowEntry {
                    window_start: now,
                    count: 1,
                },
            );
            return Ok(self.limit.saturating_sub(1));
        };

        let elapsed = now.duration_since(entry.window_start);
        if elapsed >= self.per {
            entry.window_start = now;
            entry.count = 1;
            return Ok(self.limit.saturating_sub(1));
        }

        if entry.count >= self.limit {
            return Err(self.per - elapsed);
        }

        entry.count += 1;
        Ok(self.limit - entry.count)
    }

    /// Drops keys whose window has expired. Returns how many were removed.
    pub async fn prune(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.window_start) < self.per);
        before - entries.len()
    }

    pub async fn tracked_keys(&self) -> usize {
        self.entries.lock().await.len()
    }
}

/// Prunes expired windows once per window for the lifetime of the process.
pub fn spawn_prune_worker(limiter: RateLimiter) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window());
        loop {
            interval.tick().await;
            let removed = limiter.prune().await;
            if removed > 0 {
                tracing::debug!(removed = removed, "Rate limiter: pruned expired windows");
            }
        }
    })
}

/// Middleware for guarded routes. Each path keeps its own counter per client.
pub async fn rate_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = addr.ip().to_string();
    let path = req.uri().path().to_string();
    let key = format!("{}:{}", ip, path);

    match state.rate_limiter.check(&key).await {
        Ok(remaining) => {
            tracing::debug!(ip = %ip, path = %path, remaining = remaining, "Rate limit check passed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            tracing::warn!(
                ip = %ip,
                path = %path,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );
            Err(AppError::RateLimited)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: u32 = 5;
    const PER: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new(LIMIT, PER);

        for i in 0..LIMIT {
            let result = limiter.check("client").await;
            assert_eq!(result, Ok(LIMIT - i - 1), "request {} should be allowed", i + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocks_request_after_limit() {
        let limiter = RateLimiter::new(LIMIT, PER);
        for _ in 0..LIMIT {
            limiter.check("client").await.unwrap();
        }

        tokio::time::advance(Duration::from_secs(20)).await;
        let retry_after = limiter.check("client").await.unwrap_err();
        assert_eq!(retry_after, Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_exactly_at_per() {
        let limiter = RateLimiter::new(LIMIT, PER);
        for _ in 0..LIMIT {
            limiter.check("client").await.unwrap();
        }

        tokio::time::advance(PER - Duration::from_millis(1)).await;
        assert!(limiter.check("client").await.is_err());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(limiter.check("client").await, Ok(LIMIT - 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejections_do_not_extend_window() {
        let limiter = RateLimiter::new(1, PER);
        limiter.check("client").await.unwrap();
        for _ in 0..10 {
            assert!(limiter.check("client").await.is_err());
        }
        tokio::time::advance(PER).await;
        assert!(limiter.check("client").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_keys_have_separate_limits() {
        let limiter = RateLimiter::new(LIMIT, PER);
        for _ in 0..LIMIT {
            limiter.check("key1").await.unwrap();
        }
        assert!(limiter.check("key1").await.is_err());
        assert!(limiter.check("key2").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_prune_removes_expired_windows_only() {
        let limiter = RateLimiter::new(LIMIT, PER);
        limiter.check("old").await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        limiter.check("fresh").await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(limiter.prune().await, 1);
        assert_eq!(limiter.tracked_keys().await, 1);
    }
}
