/// Dashboard API rate limiter - 20 requests per second globally
use lazy_static::lazy_static;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

lazy_static! {
    static ref API_RATE_LIMITER: Mutex<ApiRateLimiter> =
        Mutex::new(ApiRateLimiter::new(20, Duration::from_secs(1)));
}

pub struct ApiRateLimiter {
    /// Timestamps of requests inside the current window
    request_times: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl ApiRateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            request_times: VecDeque::new(),
            max_requests: max_requests.max(1),
            window,
        }
    }

    /// Record a request at `now`, or return how long to wait before one is allowed
    fn check_and_record(&mut self, now: Instant) -> Duration {
        while let Some(&front) = self.request_times.front() {
            if now.duration_since(front) >= self.window {
                self.request_times.pop_front();
            } else {
                break;
            }
        }

        if self.request_times.len() >= self.max_requests {
            if let Some(&oldest) = self.request_times.front() {
                return self.window.saturating_sub(now.duration_since(oldest));
            }
        }

        self.request_times.push_back(now);
        Duration::ZERO
    }
}

/// Wait until a request slot is free under the global limit, then take it
pub async fn rate_limit_api() {
    loop {
        let wait_duration = {
            let mut limiter = API_RATE_LIMITER
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            limiter.check_and_record(Instant::now())
        };

        if wait_duration.is_zero() {
            return;
        }

        tracing::debug!("Dashboard API rate limit: waiting {}ms", wait_duration.as_millis());
        tokio::time::sleep(wait_duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_allows_requests_within_limit() {
        let mut limiter = ApiRateLimiter::new(20, Duration::from_secs(1));
        let now = Instant::now();

        for _ in 0..20 {
            assert_eq!(limiter.check_and_record(now), Duration::ZERO);
        }
    }

    #[test]
    fn test_rate_limiter_blocks_over_limit() {
        let mut limiter = ApiRateLimiter::new(3, Duration::from_secs(1));
        let now = Instant::now();

        for _ in 0..3 {
            limiter.check_and_record(now);
        }

        let wait = limiter.check_and_record(now + Duration::from_millis(400));
        assert_eq!(wait, Duration::from_millis(600));

        // Window has passed, the slot frees up
        assert_eq!(limiter.check_and_record(now + Duration::from_secs(1)), Duration::ZERO);
    }
}
