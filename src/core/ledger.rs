//! # Restart ledger.
//!
//! Per-identity count of consecutive deaths since the last backoff. Owned by the
//! supervisor loop and never shared, so it needs no locking.

use std::collections::HashMap;

use crate::units::UnitId;

/// Consecutive-failure counters keyed by unit identity.
///
/// An absent entry means zero.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    failures: HashMap<UnitId, u32>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records one more death of `id` and returns the new count (1 on first sight).
    pub(crate) fn record_failure(&mut self, id: UnitId) -> u32 {
        let count = self.failures.entry(id).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Forgets the failure history of `id`.
    pub(crate) fn forgive(&mut self, id: UnitId) {
        self.failures.remove(&id);
    }

    /// Current count for `id` (0 if absent).
    #[cfg(test)]
    pub(crate) fn failures(&self, id: UnitId) -> u32 {
        self.failures.get(&id).copied().unwrap_or(0)
    }
}
