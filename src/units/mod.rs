//! # Supervised units and their collaborators.
//!
//! This module provides the unit-related types:
//! - [`Unit`] - trait for anything the supervisor keeps alive
//! - [`UnitId`] / [`UnitRef`] - stable identity and shared handle
//! - [`ProxyConfig`] / [`ProxyUnit`] - a port forward and its unit
//! - [`ProxyList`] - proxy list file loader
//! - [`build_command`] / [`CommandSpec`] - ssh/socat command construction
//! - [`ProcessRunner`] / [`SystemRunner`] - run a command to completion

mod command;
mod loader;
mod proxy;
mod runner;
mod unit;

pub use command::{build_command, CommandSpec};
pub use loader::{parse_proxy, ProxyList};
pub use proxy::{ProxyConfig, ProxyUnit, Transport};
pub use runner::{ProcessOutput, ProcessRunner, SystemRunner};
pub use unit::{Unit, UnitId, UnitRef};
