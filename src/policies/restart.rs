//! # Restart policy for supervised units.
//!
//! [`RestartPolicy`] decides, for every observed death, whether a unit is
//! relaunched right away or only after a fixed backoff delay.
//!
//! ## Fencepost
//! The decision looks at the failure count **after** it was incremented for the
//! death being handled. The initial "everything is dead" seeding counts as the
//! first observation, so with the default threshold of 3:
//!
//! ```text
//! count 1 (startup)      → Immediate
//! count 2 (1st death)    → Immediate
//! count 3 (2nd death)    → Immediate
//! count 4 (3rd death)    → Backoff(2min), ledger entry forgiven
//! count 1 (next death)   → Immediate    ... and the cycle repeats
//! ```
//!
//! The policy is deliberately flat: no exponential growth, no jitter, no cap on
//! the total number of cycles.

use std::time::Duration;

/// What the supervisor does with a unit whose death it just recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartDecision {
    /// Launch again without delay.
    Immediate,
    /// Forget the failure count and launch after the given delay.
    Backoff(Duration),
}

/// Threshold + fixed delay restart policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestartPolicy {
    /// Highest post-increment failure count that still restarts immediately.
    pub max_restarts: u32,
    /// Delay applied once `max_restarts` is exceeded.
    pub backoff: Duration,
}

impl RestartPolicy {
    /// Consecutive deaths tolerated before backing off.
    pub const DEFAULT_MAX_RESTARTS: u32 = 3;
    /// Delay before relaunching a unit that exceeded the threshold.
    pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2 * 60);

    /// Creates a policy with an explicit threshold and delay.
    pub const fn new(max_restarts: u32, backoff: Duration) -> Self {
        Self {
            max_restarts,
            backoff,
        }
    }

    /// Decides what to do for a unit whose failure count is now `failures`.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use proxyvisor::{RestartDecision, RestartPolicy};
    ///
    /// let policy = RestartPolicy::new(3, Duration::from_secs(120));
    /// assert_eq!(policy.decide(3), RestartDecision::Immediate);
    /// assert_eq!(policy.decide(4), RestartDecision::Backoff(Duration::from_secs(120)));
    /// ```
    pub fn decide(&self, failures: u32) -> RestartDecision {
        if failures <= self.max_restarts {
            RestartDecision::Immediate
        } else {
            RestartDecision::Backoff(self.backoff)
        }
    }
}

impl Default for RestartPolicy {
    /// Returns a policy with `max_restarts = 3` and `backoff = 2min`.
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RESTARTS, Self::DEFAULT_BACKOFF)
    }
}
