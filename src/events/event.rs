//! # Runtime events emitted by the supervisor and unit launches.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Lifecycle events**: unit execution flow (starting, stopped, failed)
//! - **Restart events**: the supervisor deferring a relaunch (backoff)
//! - **Runtime events**: shutdown and subscriber health
//!
//! The [`Event`] struct carries additional metadata such as timestamps, unit name,
//! failure reasons, captured output and backoff delays.
//!
//! Events are purely informational: the supervisor never reads them back to make
//! restart decisions.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use proxyvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_unit("8080:db.internal:5432")
//!     .with_failures(4)
//!     .with_delay(Duration::from_secs(120));
//!
//! assert_eq!(ev.kind, EventKind::BackoffScheduled);
//! assert_eq!(ev.unit.as_deref(), Some("8080:db.internal:5432"));
//! assert_eq!(ev.delay_ms, Some(120_000));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::units::UnitId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `unit`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `unit`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Runtime events ===
    /// Shutdown requested; the supervisor loop stops dequeuing.
    ShutdownRequested,

    // === Unit lifecycle events ===
    /// A unit execution is starting.
    ///
    /// Sets:
    /// - `unit`: unit name
    /// - `unit_id`: unit identity
    UnitStarting,

    /// A unit execution ended cleanly (the process exited with success).
    ///
    /// Sets:
    /// - `unit`: unit name
    /// - `unit_id`: unit identity
    UnitStopped,

    /// A unit execution ended badly (spawn failure, non-zero exit, panic).
    ///
    /// Sets:
    /// - `unit`: unit name
    /// - `unit_id`: unit identity
    /// - `reason`: failure message
    /// - `output`: captured combined output, when non-empty
    UnitFailed,

    // === Restart events ===
    /// A unit exceeded its restart budget; its relaunch is deferred.
    ///
    /// Sets:
    /// - `unit`: unit name
    /// - `unit_id`: unit identity
    /// - `failures`: the failure count that crossed the threshold
    /// - `delay_ms`: delay before the next launch (ms)
    BackoffScheduled,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the unit (or subscriber), if applicable.
    pub unit: Option<Arc<str>>,
    /// Identity of the unit, if applicable.
    pub unit_id: Option<UnitId>,
    /// Consecutive failure count.
    pub failures: Option<u32>,
    /// Backoff delay before next launch in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Captured process output.
    pub output: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            unit: None,
            unit_id: None,
            failures: None,
            delay_ms: None,
            reason: None,
            output: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a unit name.
    #[inline]
    pub fn with_unit(mut self, unit: impl Into<Arc<str>>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Attaches a unit identity.
    #[inline]
    pub fn with_unit_id(mut self, id: UnitId) -> Self {
        self.unit_id = Some(id);
        self
    }

    /// Attaches a failure count.
    #[inline]
    pub fn with_failures(mut self, n: u32) -> Self {
        self.failures = Some(n);
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches captured process output.
    #[inline]
    pub fn with_output(mut self, output: impl Into<Arc<str>>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Returns the backoff delay as a [`Duration`], if set.
    #[inline]
    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(|ms| Duration::from_millis(u64::from(ms)))
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_unit(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_unit(subscriber)
            .with_reason(info)
    }
}
