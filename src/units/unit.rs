//! # Runnable unit abstraction.
//!
//! A [`Unit`] is what the supervisor keeps alive: something with a stable
//! [`UnitId`] and an async [`execute`](Unit::execute) that runs until the
//! underlying work ends, successfully or not.
//!
//! The unit itself never talks to the completion channel. The launcher posts the
//! identity after `execute` returns, whatever the outcome (including a panic), so
//! an implementation cannot forget to announce its own death.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::UnitError;

/// Stable identity of a supervised unit.
///
/// Assigned once at load time (the proxy list uses the 1-based source line)
/// and never reused while the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(usize);

impl UnitId {
    /// Wraps a raw identity.
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the raw identity.
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<usize> for UnitId {
    fn from(raw: usize) -> Self {
        Self(raw)
    }
}

/// # Supervised, restartable unit.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use proxyvisor::{Unit, UnitError, UnitId};
///
/// struct Sleeper(UnitId);
///
/// #[async_trait]
/// impl Unit for Sleeper {
///     fn id(&self) -> UnitId { self.0 }
///     fn name(&self) -> &str { "sleeper" }
///
///     async fn execute(&self) -> Result<(), UnitError> {
///         tokio::time::sleep(std::time::Duration::from_millis(10)).await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Unit: Send + Sync + 'static {
    /// Returns the unit's stable identity.
    fn id(&self) -> UnitId;

    /// Returns a human-readable name for logs.
    fn name(&self) -> &str;

    /// Runs the unit to completion.
    ///
    /// Both `Ok` and `Err` count as a death; the error only feeds observability.
    async fn execute(&self) -> Result<(), UnitError>;
}

/// Shared handle to a unit.
pub type UnitRef = Arc<dyn Unit>;
