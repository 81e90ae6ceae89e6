//! # LogWriter - structured event logger
//!
//! A subscriber that turns incoming [`Event`]s into `tracing` records.
//! This is what the binary installs; library users may bring their own.
//!
//! ## Example output (compact formatter)
//! ```text
//!  INFO proxyvisor: unit starting unit="8080:db:5432" id=3
//!  WARN proxyvisor: unit failed unit="8080:db:5432" id=3 reason="exited with exit status: 1"
//!  INFO proxyvisor: unit output unit="8080:db:5432" output="2024/01/01 socat[42] E connect(...): Connection refused"
//!  WARN proxyvisor: too many restarts unit="8080:db:5432" id=3 failures=4 backoff=120s
//! ```

use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Target used for every record this subscriber writes.
const TARGET: &str = "proxyvisor";

/// Event writer subscriber.
#[derive(Default, Debug)]
pub struct LogWriter {
    max_restarts: Option<u32>,
}

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Includes the configured threshold in "too many restarts" records.
    #[must_use]
    pub fn with_max_restarts(mut self, max_restarts: u32) -> Self {
        self.max_restarts = Some(max_restarts);
        self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let unit = e.unit.as_deref().unwrap_or("unknown");
        let id = e.unit_id.map(|id| id.get());

        match e.kind {
            EventKind::UnitStarting => {
                info!(target: TARGET, unit, id, "unit starting");
            }
            EventKind::UnitStopped => {
                info!(target: TARGET, unit, id, "unit stopped");
            }
            EventKind::UnitFailed => {
                warn!(target: TARGET, unit, id, reason = e.reason.as_deref(), "unit failed");
                if let Some(output) = e.output.as_deref() {
                    info!(target: TARGET, unit, output, "unit output");
                }
            }
            EventKind::BackoffScheduled => {
                let backoff = e.delay().unwrap_or(Duration::ZERO);
                warn!(
                    target: TARGET,
                    unit,
                    id,
                    failures = e.failures,
                    max_restarts = self.max_restarts,
                    backoff = ?backoff,
                    "too many restarts"
                );
            }
            EventKind::ShutdownRequested => {
                info!(target: TARGET, "shutdown requested");
            }
            EventKind::SubscriberOverflow => {
                warn!(target: TARGET, subscriber = unit, reason = e.reason.as_deref(), "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                error!(target: TARGET, subscriber = unit, info = e.reason.as_deref(), "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitId;

    #[tokio::test]
    async fn handles_every_kind_without_metadata() {
        let writer = LogWriter::new().with_max_restarts(3);
        for kind in [
            EventKind::UnitStarting,
            EventKind::UnitStopped,
            EventKind::UnitFailed,
            EventKind::BackoffScheduled,
            EventKind::ShutdownRequested,
            EventKind::SubscriberOverflow,
            EventKind::SubscriberPanicked,
        ] {
            writer.on_event(&Event::new(kind)).await;
        }
    }

    #[tokio::test]
    async fn handles_failure_with_output() {
        let ev = Event::new(EventKind::UnitFailed)
            .with_unit("8080:db:5432")
            .with_unit_id(UnitId::new(3))
            .with_reason("exited with exit status: 1")
            .with_output("Connection refused");
        LogWriter::new().on_event(&ev).await;
    }
}
