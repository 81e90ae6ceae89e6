//! Restart policy.
//!
//! This module groups the knobs that control **when** a dead unit is relaunched.
//!
//! ## Contents
//! - [`RestartPolicy`] threshold of tolerated consecutive deaths + fixed backoff delay
//! - [`RestartDecision`] outcome of one decision (immediate / backoff)
//!
//! ## Quick wiring
//! ```text
//! SupervisorConfig { max_restarts, backoff }
//!      └─► core::supervisor loop uses:
//!           - ledger.record_failure(id) → count
//!           - policy.decide(count)       → Immediate | Backoff(delay)
//! ```
//!
//! ## Defaults
//! - `max_restarts = 3`, `backoff = 2min`.

mod restart;

pub use restart::{RestartDecision, RestartPolicy};
