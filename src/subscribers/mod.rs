//! # Event subscribers for the proxyvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and
//! the built-in [`LogWriter`], which together form the observability sink of the
//! supervisor. Subscribers are fire-and-forget: nothing they do feeds back into
//! restart decisions.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Launcher / loop ── publish(Event) ──► Bus ──► subscriber_listener
//!                                                     │
//!                                                     └──► SubscriberSet::emit(&Event)
//!                                                               │
//!                                                      ┌────────┴────────┐
//!                                                      ▼                 ▼
//!                                                  LogWriter          Custom ...
//! ```

mod log;
mod subscribe;
mod subscriber_set;

pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;

pub(crate) use subscriber_set::panic_message;
