//! # Process runner.
//!
//! [`ProcessRunner`] runs a [`CommandSpec`] to completion and reports whether it
//! succeeded along with everything it printed. [`SystemRunner`] is the real
//! implementation on top of `tokio::process`; tests substitute their own.
//!
//! ## Rules
//! - stdin is closed, stdout and stderr are captured
//! - output is stdout followed by stderr, decoded lossily
//! - the child is killed if the future is dropped (runtime shutdown)

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::units::command::CommandSpec;

/// Outcome of one process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Whether the process exited with a success status.
    pub success: bool,
    /// Exit status as rendered by the OS.
    pub status: String,
    /// Combined stdout and stderr.
    pub output: String,
}

/// Runs external commands to completion.
#[async_trait]
pub trait ProcessRunner: Send + Sync + 'static {
    /// Runs `cmd` until it exits.
    ///
    /// Returns `Err` only when the process could not be started or awaited.
    async fn run(&self, cmd: &CommandSpec) -> io::Result<ProcessOutput>;
}

/// [`ProcessRunner`] backed by `tokio::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, cmd: &CommandSpec) -> io::Result<ProcessOutput> {
        let out = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));

        Ok(ProcessOutput {
            success: out.status.success(),
            status: out.status.to_string(),
            output,
        })
    }
}
