use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Pacing gate shared by everything that calls the ranked-search backend.
///
/// Admission is serialized: the lock is held while a caller sleeps, so two
/// callers can never compute overlapping wait windows.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_admission: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_admission: Mutex::new(None) }
    }

    /// Suspend until at least `interval` has passed since the previous admission.
    pub async fn wait_if_needed(&self) {
        self.wait_with_pause(Duration::ZERO).await
    }

    /// Like [`wait_if_needed`](Self::wait_if_needed), but the gap since the
    /// previous admission must also cover `pause`.
    pub async fn wait_with_pause(&self, pause: Duration) {
        let gap = self.interval + pause;
        let mut last = self.last_admission.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < gap {
                let wait = gap - elapsed;
                tracing::debug!(wait_ms = wait.as_millis() as u64, "rate limiter pausing");
                sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}
