//! # External command construction.
//!
//! Pure mapping from a [`ProxyConfig`] to the command that implements it:
//!
//! ```text
//! Encrypted: ssh -o BatchMode=yes -L <local>:<remote>:<remote_port> <remote>
//! Plain:     socat tcp-listen:<local>,reuseaddr,fork tcp:<remote>:<remote_port>
//! ```
//!
//! `BatchMode=yes` keeps ssh from ever prompting; a host that needs a password
//! simply fails and is retried like any other death.

use std::fmt;

use crate::units::proxy::{ProxyConfig, Transport};

/// Program plus arguments, ready to be handed to a [`ProcessRunner`](crate::ProcessRunner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable name or path.
    pub program: String,
    /// Arguments, not including the program.
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Creates a command from a program and its arguments.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Builds the external command for `proxy`.
pub fn build_command(proxy: &ProxyConfig) -> CommandSpec {
    match proxy.transport {
        Transport::Encrypted => CommandSpec::new(
            "ssh",
            [
                "-o".to_string(),
                "BatchMode=yes".to_string(),
                "-L".to_string(),
                proxy.to_string(),
                proxy.remote.clone(),
            ],
        ),
        Transport::Plain => CommandSpec::new(
            "socat",
            [
                format!("tcp-listen:{},reuseaddr,fork", proxy.local_port),
                format!("tcp:{}:{}", proxy.remote, proxy.remote_port),
            ],
        ),
    }
}
