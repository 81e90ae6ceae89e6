//! # Completion channel.
//!
//! Multi-producer, single-consumer queue of [`UnitId`]s announcing that a unit
//! stopped. Every in-flight launch holds a [`DeathSender`]; the supervisor loop
//! owns the only [`DeathReceiver`].
//!
//! ## Capacity
//! The channel is bounded by the number of configured units. Each identity has
//! at most one "token" alive at any instant (queued, running, or waiting out a
//! backoff), so at most `units` identities can be queued and neither the initial
//! seeding nor a completion post ever waits for room.

use tokio::sync::mpsc;

use crate::units::UnitId;

/// Creates a completion channel able to hold `capacity` pending deaths (min 1).
pub(crate) fn completion_channel(capacity: usize) -> (DeathSender, DeathReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (DeathSender { tx }, DeathReceiver { rx })
}

/// Producer side; cheap to clone, one per launch.
#[derive(Clone, Debug)]
pub(crate) struct DeathSender {
    tx: mpsc::Sender<UnitId>,
}

impl DeathSender {
    /// Enqueues an identity without waiting; used to seed startup deaths.
    ///
    /// Returns the identity back if the channel is full or closed.
    pub(crate) fn seed(&self, id: UnitId) -> Result<(), UnitId> {
        self.tx.try_send(id).map_err(|e| match e {
            mpsc::error::TrySendError::Full(id) | mpsc::error::TrySendError::Closed(id) => id,
        })
    }

    /// Announces that `id` stopped.
    ///
    /// A closed channel means the supervisor loop is gone; the post is dropped.
    pub(crate) async fn post(&self, id: UnitId) {
        let _ = self.tx.send(id).await;
    }
}

/// Consumer side, owned by the supervisor loop.
#[derive(Debug)]
pub(crate) struct DeathReceiver {
    rx: mpsc::Receiver<UnitId>,
}

impl DeathReceiver {
    /// Waits for the next dead identity.
    ///
    /// Returns `None` once every sender is gone.
    pub(crate) async fn next(&mut self) -> Option<UnitId> {
        self.rx.recv().await
    }
}
