//! Request ceiling for the aggregator's own pages
//!
//! The limiter counts permits issued since it was created and only hands out the
//! next one once `elapsed_seconds * rate >= issued + 1`. The budget is measured
//! from process start, so idle periods bank permits: after a quiet minute a burst
//! of requests goes through immediately until the count catches up with the clock.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Shared gate limiting requests to `rate` per elapsed second
#[derive(Debug)]
pub struct RateLimiter {
    start: Instant,
    rate: u32,
    issued: Mutex<u64>,
}

impl RateLimiter {
    /// Creates a limiter allowing `rate` requests per second (clamped to at least 1)
    pub fn new(rate: u32) -> Self {
        Self {
            start: Instant::now(),
            rate: rate.max(1),
            issued: Mutex::new(0),
        }
    }

    /// Waits until one more request is permitted
    ///
    /// Callers that are refused sleep until the next permit is due instead of
    /// spinning, so other tasks keep running. Several waiters may wake together;
    /// only one claims each permit and the rest go back to sleep.
    pub async fn acquire(&self) {
        let mut waited = false;
        loop {
            match self.try_acquire() {
                Ok(()) => {
                    if waited {
                        tracing::trace!("Rate limit permit granted after waiting");
                    }
                    return;
                }
                Err(wait) => {
                    waited = true;
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Claims a permit if one is available, otherwise returns how long to wait
    fn try_acquire(&self) -> Result<(), Duration> {
        let elapsed = self.start.elapsed().as_nanos();
        let mut issued = self.issued.lock().unwrap_or_else(|e| e.into_inner());

        // Earliest instant (in nanos since start) at which permit `issued + 1` is due
        let due = ((*issued as u128 + 1) * NANOS_PER_SEC).div_ceil(self.rate as u128);
        if elapsed >= due {
            *issued += 1;
            Ok(())
        } else {
            let wait = u64::try_from(due - elapsed).unwrap_or(u64::MAX);
            Err(Duration::from_nanos(wait))
        }
    }

    /// Number of permits handed out so far
    pub fn issued(&self) -> u64 {
        *self.issued.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Time since the limiter was created
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_first_permit_waits_one_slot() {
        let limiter = RateLimiter::new(3);
        limiter.acquire().await;

        assert_eq!(limiter.issued(), 1);
        assert!(limiter.elapsed() >= Duration::from_nanos(333_333_334));
        assert!(limiter.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_rate() {
        let limiter = RateLimiter::new(3);
        for _ in 0..9 {
            limiter.acquire().await;
        }

        assert_eq!(limiter.issued(), 9);
        assert!(limiter.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_time_is_banked() {
        let limiter = RateLimiter::new(3);
        tokio::time::sleep(Duration::from_secs(2)).await;

        let before = limiter.elapsed();
        for _ in 0..6 {
            limiter.acquire().await;
        }
        assert_eq!(limiter.elapsed(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_never_exceed_rate() {
        let limiter = Arc::new(RateLimiter::new(3));
        let grants = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = limiter.clone();
            let grants = grants.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..5 {
                    limiter.acquire().await;
                    grants.lock().unwrap().push(limiter.elapsed());
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut grants = grants.lock().unwrap().clone();
        grants.sort();
        assert_eq!(grants.len(), 40);
        assert_eq!(limiter.issued(), 40);

        for (i, elapsed) in grants.iter().enumerate() {
            let count = (i + 1) as u128;
            assert!(
                count * NANOS_PER_SEC <= elapsed.as_nanos() * 3,
                "{} permits issued after only {:?}",
                count,
                elapsed
            );
        }
    }

    #[test]
    fn test_zero_rate_is_clamped() {
        let limiter = RateLimiter::new(0);
        assert_eq!(limiter.rate(), 1);
    }
}
