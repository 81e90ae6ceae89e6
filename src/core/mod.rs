//! Runtime core: the supervision and restart engine.
//!
//! The public API from this module is [`Supervisor`] and the shutdown helper.
//!
//! Internal modules:
//! - [`channel`]: completion channel (MPSC of dead unit ids);
//! - [`ledger`]: per-unit consecutive failure counters;
//! - [`launcher`]: detached immediate/delayed launches that always post their death;
//! - [`supervisor`]: the loop tying them together;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod channel;
mod launcher;
mod ledger;
mod shutdown;
mod supervisor;

pub use shutdown::wait_for_shutdown_signal;
pub use supervisor::Supervisor;
