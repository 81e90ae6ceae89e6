//! # proxyvisor
//!
//! **proxyvisor** keeps a fixed set of port forwards alive. Each forward is an
//! external process (`socat` for plain TCP relays, `ssh -L` for encrypted
//! tunnels); whenever one exits it is started again, and a forward that keeps
//! dying is parked for a fixed backoff before its next attempt.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  ProxyUnit   │   │  ProxyUnit   │   │  ProxyUnit   │
//!     │  (line 3)    │   │  (line 4)    │   │  (line 9)    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor loop (single consumer)                                │
//! │  - completion channel (ids of dead units)                         │
//! │  - Ledger (consecutive failures per id)                           │
//! │  - RestartPolicy (immediate vs backoff)                           │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │    launch    │   │    launch    │   │ launch_after │   │
//!     │  (detached)  │   │  (detached)  │   │ (sleep, then)│   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ post(id)         │ post(id)         │ post(id)        │
//!      └──────────► completion channel ◄─────┘                 │
//!                                                              ▼
//!                                       Bus ──► SubscriberSet ──► LogWriter
//! ```
//!
//! ### Lifecycle of one identity
//! ```text
//! PENDING_LAUNCH ──► RUNNING ──► (exit, any status) ──► PENDING_LAUNCH
//!                                                   └─► BACKOFF_WAIT ──► PENDING_LAUNCH
//! ```
//! Every unit starts in `PENDING_LAUNCH` (seeded as dead). There is no terminal
//! state while the process lives.
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                        |
//! |-------------------|----------------------------------------------------------|-------------------------------------------|
//! | **Supervision**   | Restart loop with per-unit failure ledger.               | [`Supervisor`]                            |
//! | **Policies**      | Threshold + fixed backoff restart policy.                | [`RestartPolicy`], [`RestartDecision`]    |
//! | **Units**         | Anything with an id and an async `execute`.              | [`Unit`], [`UnitId`], [`UnitRef`]         |
//! | **Proxies**       | Proxy list loading, ssh/socat command building.          | [`ProxyList`], [`ProxyUnit`], [`build_command`] |
//! | **Processes**     | Run a command to completion, capture output.             | [`ProcessRunner`], [`SystemRunner`]       |
//! | **Subscriber API**| Observe lifecycle events (logging, alerts).              | [`Subscribe`], [`LogWriter`]              |
//! | **Errors**        | Typed startup, config and unit errors.                   | [`RuntimeError`], [`ConfigError`], [`UnitError`] |
//! | **Configuration** | Threshold, backoff delay, bus capacity.                  | [`SupervisorConfig`]                      |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use proxyvisor::{Supervisor, SupervisorConfig, Unit, UnitError, UnitId, UnitRef};
//!
//! struct Flaky;
//!
//! #[async_trait]
//! impl Unit for Flaky {
//!     fn id(&self) -> UnitId { UnitId::new(1) }
//!     fn name(&self) -> &str { "flaky" }
//!     async fn execute(&self) -> Result<(), UnitError> {
//!         Err(UnitError::Panicked { info: "always fails".into() })
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = SupervisorConfig {
//!         backoff: Duration::from_millis(10),
//!         ..SupervisorConfig::default()
//!     };
//!     let sup = Supervisor::new(cfg, Vec::new());
//!
//!     let token = CancellationToken::new();
//!     let stop = token.clone();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(50)).await;
//!         stop.cancel();
//!     });
//!
//!     let units: Vec<UnitRef> = vec![Arc::new(Flaky)];
//!     sup.run(units, token).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;
mod units;

pub mod observability;

// ---- Public re-exports ----

pub use crate::core::{wait_for_shutdown_signal, Supervisor};
pub use config::SupervisorConfig;
pub use error::{ConfigError, ProxyParseError, RuntimeError, UnitError};
pub use events::{Bus, Event, EventKind};
pub use policies::{RestartDecision, RestartPolicy};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use units::{
    build_command, parse_proxy, CommandSpec, ProcessOutput, ProcessRunner, ProxyConfig, ProxyList,
    ProxyUnit, SystemRunner, Transport, Unit, UnitId, UnitRef,
};
