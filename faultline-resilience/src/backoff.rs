//! Reconnect backoff and pacing jitter

use rand::Rng;
use std::time::Duration;

/// Exponential reconnect backoff.
///
/// Starts at the initial delay, doubles on every consecutive failure up
/// to the cap, and resets to the initial delay on the first success.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl ReconnectBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay to sleep before the next attempt. Doubles the stored delay,
    /// capped at the maximum.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    /// Call on successful connect; the next failure starts the ladder over.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    pub fn current(&self) -> Duration {
        self.current
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30))
    }
}

/// Scale a pacing delay by a uniform factor in [0.8, 1.2).
///
/// Desynchronizes workers that would otherwise fire in lockstep.
pub fn apply_jitter<R: Rng>(delay: Duration, rng: &mut R) -> Duration {
    if delay.is_zero() {
        return delay;
    }
    let factor = rng.random_range(0.8..1.2);
    Duration::from_nanos((delay.as_nanos() as f64 * factor) as u64)
}
