//! Reconnect pacing.

use std::time::Duration;

/// Capped exponential backoff between reconnect attempts.
///
/// There is no attempt limit: the subscription contract is to keep trying
/// until torn down. The delay resets once frames flow again.
#[derive(Clone, Debug)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(15),
            backoff_multiplier: 2.0,
        }
    }
}

impl ReconnectPolicy {
    #[must_use]
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    #[must_use]
    pub fn with_backoff_multiplier(mut self, backoff_multiplier: f32) -> Self {
        self.backoff_multiplier = backoff_multiplier;
        self
    }
}

/// Mutable delay tracker for one subscription.
pub(crate) struct ReconnectDelay {
    policy: ReconnectPolicy,
    current: Duration,
}

impl ReconnectDelay {
    pub(crate) fn new(policy: ReconnectPolicy) -> Self {
        let current = policy.initial_delay;
        Self { policy, current }
    }

    /// The delay to sleep before the next attempt; scales the one after.
    pub(crate) fn next(&mut self) -> Duration {
        let delay = self.current;
        let multiplier = self.policy.backoff_multiplier.max(1.0) as f64;
        let scaled = Duration::from_secs_f64(self.current.as_secs_f64() * multiplier);
        self.current = scaled.min(self.policy.max_delay);
        delay
    }

    /// Back to the initial delay, after a healthy stretch of frames.
    pub(crate) fn reset(&mut self) {
        self.current = self.policy.initial_delay;
    }
}
