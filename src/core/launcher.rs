//! # Launch a unit as a detached task.
//!
//! Executes one run of a [`Unit`], publishes lifecycle events to the [`Bus`], and
//! posts the unit's identity to the completion channel when the run is over.
//!
//! ## Event flow
//!
//! ```text
//! Immediate:
//!   spawn ─► UnitStarting ─► unit.execute() ─► UnitStopped | UnitFailed ─► post(id)
//!
//! Delayed:
//!   spawn ─► sleep(delay) | cancelled ─► (same as immediate)
//! ```
//!
//! ## Rules
//! - A finished run posts its identity **exactly once**, for every outcome:
//!   clean exit, error, or panic inside the unit
//! - Once the shutdown token is cancelled nothing new starts: a pending backoff
//!   is abandoned and a running execution is dropped (its child is killed)
//! - Cancelled runs post nothing; the loop is no longer listening
//! - No handle is kept; the post is the launch's only observable effect

use std::time::Duration;

use futures::FutureExt;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::{
    core::channel::DeathSender,
    error::UnitError,
    events::{Bus, Event, EventKind},
    subscribers::panic_message,
    units::UnitRef,
};

/// Spawns unit executions wired to the bus and the completion channel.
#[derive(Clone, Debug)]
pub(crate) struct Launcher {
    bus: Bus,
    deaths: DeathSender,
    shutdown: CancellationToken,
}

impl Launcher {
    pub(crate) fn new(bus: Bus, deaths: DeathSender, shutdown: CancellationToken) -> Self {
        Self {
            bus,
            deaths,
            shutdown,
        }
    }

    /// Starts `unit` now, in its own task.
    pub(crate) fn launch(&self, unit: UnitRef) {
        let me = self.clone();
        tokio::spawn(async move { me.run_once(unit).await });
    }

    /// Starts `unit` after `delay`, in its own task, unless shutdown comes first.
    pub(crate) fn launch_after(&self, unit: UnitRef, delay: Duration) {
        let me = self.clone();
        tokio::spawn(async move {
            let sleep = time::sleep(delay);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => me.run_once(unit).await,
                _ = me.shutdown.cancelled() => {}
            }
        });
    }

    /// Executes one run of `unit` and announces its death.
    async fn run_once(&self, unit: UnitRef) {
        if self.shutdown.is_cancelled() {
            return;
        }
        self.bus.publish(
            Event::new(EventKind::UnitStarting)
                .with_unit(unit.name())
                .with_unit_id(unit.id()),
        );

        let run = std::panic::AssertUnwindSafe(unit.execute()).catch_unwind();
        let res = select! {
            biased;
            _ = self.shutdown.cancelled() => return,
            out = run => match out {
                Ok(res) => res,
                Err(panic_err) => Err(UnitError::Panicked {
                    info: panic_message(&*panic_err),
                }),
            },
        };

        match res {
            Ok(()) => self.publish_stopped(&unit),
            Err(e) => self.publish_failed(&unit, &e),
        }

        self.deaths.post(unit.id()).await;
    }

    /// Publishes `UnitStopped` (clean exit).
    fn publish_stopped(&self, unit: &UnitRef) {
        self.bus.publish(
            Event::new(EventKind::UnitStopped)
                .with_unit(unit.name())
                .with_unit_id(unit.id()),
        );
    }

    /// Publishes `UnitFailed` with the error and any captured output.
    fn publish_failed(&self, unit: &UnitRef, err: &UnitError) {
        let mut ev = Event::new(EventKind::UnitFailed)
            .with_unit(unit.name())
            .with_unit_id(unit.id())
            .with_reason(err.to_string());
        if let Some(output) = err.output() {
            ev = ev.with_output(output);
        }
        self.bus.publish(ev);
    }
}
