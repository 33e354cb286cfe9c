//! Sliding-window rate limiter for EasyBroker's 20 requests/second limit.
//!
//! Constructed explicitly and shared via `Arc` rather than held as global
//! state, so multiple independently-configured clients can coexist in one
//! process and tests get per-instance isolation.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{self, Instant};

/// Maximum admissions per rolling window.
pub const MAX_REQUESTS: usize = 20;
/// Length of the rolling window.
pub const TIME_WINDOW: Duration = Duration::from_secs(1);

/// Concurrency-safe sliding-window throttle.
///
/// Admission timestamps are kept behind a single mutex held across the
/// admission check (including the wait when the ceiling is reached), so
/// callers are admitted in lock-acquisition order. The throttled action
/// itself runs outside the lock.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    admissions: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Limiter with the EasyBroker default of 20 requests/second.
    pub fn new() -> Self {
        Self::with_limit(MAX_REQUESTS, TIME_WINDOW)
    }

    /// Limiter with a custom ceiling and window.
    pub fn with_limit(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            admissions: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    /// Block until admitting one more request stays under the ceiling,
    /// then record the admission.
    ///
    /// Waits at most one full window. There is no error path: excess
    /// waiting is the cost of admission, never a failure.
    pub async fn acquire(&self) {
        let mut admissions = self.admissions.lock().await;

        let now = Instant::now();
        while admissions
            .front()
            .is_some_and(|&oldest| now.duration_since(oldest) > self.window)
        {
            admissions.pop_front();
        }

        if admissions.len() >= self.max_requests {
            if let Some(&oldest) = admissions.front() {
                let wait = self.window.saturating_sub(oldest.elapsed());
                if !wait.is_zero() {
                    time::sleep(wait).await;
                }
                admissions.pop_front();
            }
        }

        admissions.push_back(Instant::now());
    }

    /// Run `action` once admitted. The action's result (or failure)
    /// propagates unchanged; its latency does not hold the admission lock.
    pub async fn throttle<F, T>(&self, action: F) -> T
    where
        F: Future<Output = T>,
    {
        self.acquire().await;
        action.await
    }

    /// Clear the admission history. Intended for test isolation; not safe
    /// to call while requests are in flight if exactness is required.
    pub async fn reset(&self) {
        self.admissions.lock().await.clear();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn admits_up_to_the_ceiling_without_delay() {
        let limiter = RateLimiter::new();
        let start = Instant::now();
        for _ in 0..MAX_REQUESTS {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn delays_the_twenty_first_admission_until_window_rollover() {
        let limiter = RateLimiter::new();
        for _ in 0..MAX_REQUESTS {
            limiter.acquire().await;
        }

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() >= TIME_WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_only_for_the_remainder_of_the_window() {
        let limiter = RateLimiter::with_limit(2, Duration::from_secs(1));
        limiter.acquire().await;
        time::advance(Duration::from_millis(600)).await;
        limiter.acquire().await;

        let start = Instant::now();
        limiter.acquire().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(400));
        assert!(waited < Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_admissions_free_the_window() {
        let limiter = RateLimiter::new();
        for _ in 0..MAX_REQUESTS {
            limiter.acquire().await;
        }
        time::advance(TIME_WINDOW + Duration::from_millis(1)).await;

        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_the_admission_history() {
        let limiter = RateLimiter::new();
        for _ in 0..MAX_REQUESTS {
            limiter.acquire().await;
        }
        limiter.reset().await;

        let start = Instant::now();
        for _ in 0..MAX_REQUESTS {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn throttle_returns_the_action_result() {
        let limiter = RateLimiter::new();
        let value = limiter.throttle(async { 7 }).await;
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn throttle_propagates_action_failure() {
        let limiter = RateLimiter::new();
        let result: Result<(), &str> = limiter.throttle(async { Err("boom") }).await;
        assert_eq!(result, Err("boom"));
    }
}
