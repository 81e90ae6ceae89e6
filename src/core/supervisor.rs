//! # Supervisor: the restart loop.
//!
//! The [`Supervisor`] owns the event bus, a [`SubscriberSet`], and the runtime
//! configuration. [`Supervisor::run`] seeds every unit as dead and then turns
//! each death into a relaunch, immediately or after a backoff.
//!
//! ## High-level architecture
//! ```text
//! Inputs to run():
//!   Vec<UnitRef>  ──►  Supervisor::run(units, shutdown_token)
//!
//! Preparation:
//!   - index units by id (duplicates rejected)
//!   - subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)   (fire-and-forget)
//!   - completion_channel(units.len()), seed every id once
//!
//! Loop (single consumer, owns the Ledger):
//!   id ◄── DeathReceiver::next()
//!    ├─► failures = ledger.record_failure(id)
//!    └─► policy.decide(failures)
//!          ├─ Immediate        ─► Launcher::launch(unit)                   (detached)
//!          └─ Backoff(delay)   ─► ledger.forgive(id)
//!                                 Bus.publish(BackoffScheduled)
//!                                 Launcher::launch_after(unit, delay)      (detached)
//!
//! Every launch ── post(id) ──► completion channel ──► back to the loop
//! ```
//!
//! ## Rules
//! - The loop never awaits a unit or a backoff sleep; it only waits for the next death
//! - A unit is launched only in response to its own dequeued death, so at most one
//!   execution per identity is ever in flight
//! - Clean exits and failures are both deaths
//! - The loop runs until the shutdown token is cancelled; `run` returns once the
//!   subscribers have drained the `ShutdownRequested` event
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use proxyvisor::{
//!     LogWriter, ProxyList, Subscribe, Supervisor, SupervisorConfig, SystemRunner, Transport,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let proxies = ProxyList::load("proxies.list", Transport::Plain)?;
//!     let units = proxies.into_units(Arc::new(SystemRunner));
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let sup = Supervisor::new(SupervisorConfig::default(), subs);
//!
//!     sup.run(units, CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::{
    channel::{completion_channel, DeathReceiver},
    launcher::Launcher,
    ledger::Ledger,
};
use crate::policies::{RestartDecision, RestartPolicy};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::units::{UnitId, UnitRef};
use crate::{
    config::SupervisorConfig,
    error::RuntimeError,
    events::{Bus, Event, EventKind},
};

/// Keeps a fixed set of units alive.
pub struct Supervisor {
    cfg: SupervisorConfig,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl Supervisor {
    /// Creates a new supervisor with the given config and subscribers.
    pub fn new(cfg: SupervisorConfig, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            bus,
            subscribers,
        }
    }

    /// Returns the event bus; subscribe before calling [`run`](Self::run) to see startup events.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Supervises `units` until `shutdown` is cancelled.
    ///
    /// Fails only before anything is launched: on an empty unit set or on
    /// duplicate identities.
    pub async fn run(
        self,
        units: Vec<UnitRef>,
        shutdown: CancellationToken,
    ) -> Result<(), RuntimeError> {
        let table = index_units(units)?;
        let Supervisor {
            cfg,
            bus,
            subscribers,
        } = self;

        let subs = SubscriberSet::new(subscribers, bus.clone());
        let listener = subscriber_listener(&bus, subs);

        let (deaths_tx, deaths_rx) = completion_channel(table.len());
        let mut ids: Vec<UnitId> = table.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            let seeded = deaths_tx.seed(id);
            debug_assert!(seeded.is_ok(), "completion channel smaller than unit set");
        }

        let lp = SupervisorLoop {
            units: table,
            ledger: Ledger::new(),
            policy: cfg.restart_policy(),
            launcher: Launcher::new(bus.clone(), deaths_tx, shutdown.clone()),
            bus: bus.clone(),
        };

        lp.drive(deaths_rx, &shutdown).await;
        bus.publish(Event::new(EventKind::ShutdownRequested));
        if let Err(err) = listener.await {
            tracing::warn!(target: "proxyvisor", error = %err, "subscriber listener aborted");
        }
        Ok(())
    }
}

/// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
///
/// Stops after forwarding `ShutdownRequested` and resolves once the subscribers drained.
fn subscriber_listener(bus: &Bus, set: SubscriberSet) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    set.emit(&ev);
                    if ev.kind == EventKind::ShutdownRequested {
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    })
}

/// Builds the id → unit table, rejecting empty and duplicate sets.
fn index_units(units: Vec<UnitRef>) -> Result<HashMap<UnitId, UnitRef>, RuntimeError> {
    if units.is_empty() {
        return Err(RuntimeError::NoUnits);
    }
    let mut table = HashMap::with_capacity(units.len());
    for unit in units {
        let id = unit.id();
        if table.insert(id, unit).is_some() {
            return Err(RuntimeError::DuplicateUnit { id });
        }
    }
    Ok(table)
}

/// State owned exclusively by the loop task.
struct SupervisorLoop {
    units: HashMap<UnitId, UnitRef>,
    ledger: Ledger,
    policy: RestartPolicy,
    launcher: Launcher,
    bus: Bus,
}

impl SupervisorLoop {
    /// Consumes deaths until `shutdown` is cancelled.
    async fn drive(mut self, mut deaths: DeathReceiver, shutdown: &CancellationToken) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                next = deaths.next() => match next {
                    Some(id) => self.on_death(id),
                    // The loop's own launcher holds a sender, so this only
                    // happens if the runtime is tearing down.
                    None => break,
                },
            }
        }
    }

    /// Records the death of `id` and dispatches its relaunch.
    fn on_death(&mut self, id: UnitId) {
        let Some(unit) = self.units.get(&id).cloned() else {
            return;
        };

        let failures = self.ledger.record_failure(id);
        match self.policy.decide(failures) {
            RestartDecision::Immediate => self.launcher.launch(unit),
            RestartDecision::Backoff(delay) => {
                self.ledger.forgive(id);
                self.bus.publish(
                    Event::new(EventKind::BackoffScheduled)
                        .with_unit(unit.name())
                        .with_unit_id(id)
                        .with_failures(failures)
                        .with_delay(delay),
                );
                self.launcher.launch_after(unit, delay);
            }
        }
    }
}
