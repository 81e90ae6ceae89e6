//! # Global runtime configuration.
//!
//! Provides [`SupervisorConfig`], the settings of the supervisor runtime.
//!
//! Config is used in two ways:
//! 1. **Supervisor creation**: `Supervisor::new(config, subscribers)`
//! 2. **Restart decisions**: [`SupervisorConfig::restart_policy`] feeds the loop
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by the bus
//! - `backoff = 0s` → backoff still spawns a delayed launch, it just fires immediately

use std::time::Duration;

use crate::policies::RestartPolicy;

/// Global configuration for the supervisor runtime.
///
/// ## Field semantics
/// - `max_restarts`: consecutive deaths tolerated before a backoff (the threshold)
/// - `backoff`: fixed delay before relaunching a unit that exceeded `max_restarts`
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Highest post-increment failure count that still restarts immediately.
    pub max_restarts: u32,

    /// Delay inserted before relaunching a unit once `max_restarts` is exceeded.
    pub backoff: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl SupervisorConfig {
    /// Returns the restart policy derived from this config.
    #[inline]
    pub fn restart_policy(&self) -> RestartPolicy {
        RestartPolicy::new(self.max_restarts, self.backoff)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `max_restarts = 3`
    /// - `backoff = 2min`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            max_restarts: RestartPolicy::DEFAULT_MAX_RESTARTS,
            backoff: RestartPolicy::DEFAULT_BACKOFF,
            bus_capacity: 1024,
        }
    }
}
