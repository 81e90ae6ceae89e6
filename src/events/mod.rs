//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the supervisor loop,
//! unit launches and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor` loop (`BackoffScheduled`, `ShutdownRequested`),
//!   `Launcher` (`UnitStarting`, `UnitStopped`, `UnitFailed`),
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: `Supervisor::subscriber_listener()` (fans out to `SubscriberSet`).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
