//! Request pacing shared by every call issued through one client.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;

/// Enforces a minimum interval between consecutive requests. A zero cooldown
/// disables pacing entirely.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    cooldown: Duration,
    last_call: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_call: Arc::new(Mutex::new(None)),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_unlimited(&self) -> bool {
        self.cooldown.is_zero()
    }

    /// Waits out the rest of the cooldown, then stamps the current call.
    pub async fn hit(&self) {
        if self.is_unlimited() {
            return;
        }
        let mut guard = self.last_call.lock().await;
        let wait = remaining_wait(*guard, Instant::now(), self.cooldown);
        if !wait.is_zero() {
            tracing::trace!(wait_ms = wait.as_millis() as u64, "pacing request");
            sleep(wait).await;
        }
        *guard = Some(Instant::now());
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

fn remaining_wait(last: Option<Instant>, now: Instant, cooldown: Duration) -> Duration {
    match last {
        Some(last) => cooldown.saturating_sub(now.saturating_duration_since(last)),
        None => Duration::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::{remaining_wait, RateLimiter};
    use std::time::{Duration, Instant};

    #[test]
    fn first_call_never_waits() {
        let wait = remaining_wait(None, Instant::now(), Duration::from_secs(1));
        assert_eq!(wait, Duration::ZERO);
    }

    #[test]
    fn wait_shrinks_with_elapsed_time() {
        let last = Instant::now();
        let now = last + Duration::from_millis(30);
        let wait = remaining_wait(Some(last), now, Duration::from_millis(100));
        assert_eq!(wait, Duration::from_millis(70));
    }

    #[test]
    fn elapsed_cooldown_yields_zero() {
        let last = Instant::now();
        let now = last + Duration::from_millis(250);
        assert_eq!(
            remaining_wait(Some(last), now, Duration::from_millis(100)),
            Duration::ZERO
        );
    }

    #[tokio::test]
    async fn unlimited_limiter_does_not_sleep() {
        let limiter = RateLimiter::unlimited();
        assert!(limiter.is_unlimited());
        let start = Instant::now();
        limiter.hit().await;
        limiter.hit().await;
        assert!(start.elapsed() < Duration::from_millis(20));
    }

    #[tokio::test]
    async fn second_hit_waits_for_cooldown_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(40));

        limiter.hit().await;
        let start = Instant::now();
        limiter.hit().await;

        assert!(start.elapsed() >= Duration::from_millis(35));
    }
}
