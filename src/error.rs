//! Error types used by the proxyvisor runtime, its units and the proxy list loader.
//!
//! This module defines three enums:
//!
//! - [`RuntimeError`] - errors raised by the supervisor before its loop starts.
//! - [`UnitError`] - reasons a single unit execution ended badly.
//! - [`ConfigError`] - malformed or unreadable proxy list files.
//!
//! All of them provide `as_label` for logs, mirroring each other.
//! Only [`ConfigError`] and [`RuntimeError`] ever reach the caller: a [`UnitError`]
//! is logged and then treated as an ordinary death by the supervisor.

use std::path::PathBuf;

use thiserror::Error;

use crate::units::UnitId;

/// # Errors produced by the proxyvisor runtime.
///
/// These are startup failures; once the supervisor loop runs it never fails.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Nothing to supervise.
    #[error("no units configured")]
    NoUnits,

    /// Two units share the same identity.
    #[error("duplicate unit id {id}")]
    DuplicateUnit {
        /// The identity that appeared twice.
        id: UnitId,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use proxyvisor::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::NoUnits.as_label(), "runtime_no_units");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::NoUnits => "runtime_no_units",
            RuntimeError::DuplicateUnit { .. } => "runtime_duplicate_unit",
        }
    }
}

/// # Errors produced by a unit execution.
///
/// Every variant is a "death" from the supervisor's point of view.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum UnitError {
    /// The external command could not be started at all.
    #[error("failed to start {program}: {error}")]
    Spawn {
        /// Program that was attempted.
        program: String,
        /// The underlying I/O error.
        #[source]
        error: std::io::Error,
    },

    /// The external command ran and exited unsuccessfully.
    #[error("exited with {status}")]
    Exited {
        /// Exit status as reported by the OS (`exit status: 1`, `signal: 9`, ...).
        status: String,
        /// Combined stdout and stderr of the process.
        output: String,
    },

    /// The unit panicked while executing.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl UnitError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use proxyvisor::UnitError;
    ///
    /// let err = UnitError::Panicked { info: "boom".into() };
    /// assert_eq!(err.as_label(), "unit_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            UnitError::Spawn { .. } => "unit_spawn_failed",
            UnitError::Exited { .. } => "unit_exited",
            UnitError::Panicked { .. } => "unit_panicked",
        }
    }

    /// Captured process output, if any was produced.
    pub fn output(&self) -> Option<&str> {
        match self {
            UnitError::Exited { output, .. } if !output.trim().is_empty() => Some(output),
            _ => None,
        }
    }
}

/// Why a single proxy line was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxyParseError {
    /// Fewer than three `:`-separated fields.
    #[error("missing {0}")]
    MissingField(&'static str),

    /// Remote host field present but empty.
    #[error("remote host is empty")]
    EmptyRemote,

    /// A port field that is not a number in `0..=65535`.
    #[error("invalid {field} {value:?}")]
    InvalidPort {
        /// Which port (`local port` / `remote port`).
        field: &'static str,
        /// The raw text that failed to parse.
        value: String,
    },

    /// The line is not UTF-8 text.
    #[error("not valid UTF-8")]
    InvalidUtf8,

    /// More than three `:`-separated fields.
    #[error("too many fields (expected <local_port>:<remote>:<remote_port>)")]
    TooManyFields,
}

/// # Errors produced while loading a proxy list.
///
/// Always fatal at startup; the message names the file and, for parse errors, the line.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The proxy list could not be read.
    #[error("failed to read proxy list '{}': {source}", path.display())]
    Read {
        /// File that was attempted.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line of the proxy list is malformed.
    #[error("{}: line {line}: {reason}", path.display())]
    Parse {
        /// File containing the bad line.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: ProxyParseError,
    },
}

impl ConfigError {
    /// Creates a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse error for the given line.
    pub fn parse(path: impl Into<PathBuf>, line: usize, reason: ProxyParseError) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            reason,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "config_read_failed",
            ConfigError::Parse { .. } => "config_parse_failed",
        }
    }
}
