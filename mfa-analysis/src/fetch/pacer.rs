//! Request pacing for external API calls.
//!
//! The disclosure APIs are public and unauthenticated; the polite contract
//! is a minimum gap between successive requests rather than a burst quota.
//! `FetchPacer` enforces that gap across every caller that shares it.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Enforces a minimum interval between successive external requests.
#[derive(Debug)]
pub struct FetchPacer {
    /// Minimum spacing between requests.
    min_interval: Duration,
    /// When the previous request was released.
    last_release: Mutex<Option<Instant>>,
    /// Name for logging
    name: String,
}

impl FetchPacer {
    /// Create a pacer with the given minimum interval.
    ///
    /// A zero interval disables pacing entirely.
    pub fn new(name: impl Into<String>, min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_release: Mutex::new(None),
            name: name.into(),
        }
    }

    /// Create a pacer from a millisecond gap, the unit used in config.
    pub fn from_millis(name: impl Into<String>, millis: u64) -> Self {
        Self::new(name, Duration::from_millis(millis))
    }

    /// Wait until the minimum interval since the previous release has
    /// passed, then claim the slot.
    pub async fn wait_turn(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last = self.last_release.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(
                    pacer = %self.name,
                    wait_ms = wait.as_millis() as u64,
                    "Pacing external request"
                );
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// The configured minimum interval.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Shared pacer that can be cloned across fetchers.
pub type SharedFetchPacer = Arc<FetchPacer>;

/// Create a shared pacer.
pub fn shared_pacer(name: impl Into<String>, millis: u64) -> SharedFetchPacer {
    Arc::new(FetchPacer::from_millis(name, millis))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_spaces_out_consecutive_calls() {
        let pacer = FetchPacer::from_millis("test", 100);

        let start = tokio::time::Instant::now();
        pacer.wait_turn().await;
        pacer.wait_turn().await;
        pacer.wait_turn().await;

        // Two enforced gaps of 100ms each.
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_zero_interval_is_free() {
        let pacer = FetchPacer::from_millis("test", 0);
        let start = std::time::Instant::now();
        for _ in 0..50 {
            pacer.wait_turn().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_interval_passed() {
        let pacer = FetchPacer::from_millis("test", 50);
        pacer.wait_turn().await;

        tokio::time::sleep(Duration::from_millis(80)).await;

        let before = tokio::time::Instant::now();
        pacer.wait_turn().await;
        assert!(before.elapsed() < Duration::from_millis(10));
    }
}
