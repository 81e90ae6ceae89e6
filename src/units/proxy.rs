//! # Port-forward configuration and its [`Unit`] implementation.
//!
//! [`ProxyConfig`] is one line of the proxy list; [`ProxyUnit`] turns it into a
//! supervised unit by building the external command and handing it to a
//! [`ProcessRunner`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::UnitError;
use crate::units::command::build_command;
use crate::units::runner::ProcessRunner;
use crate::units::{Unit, UnitId};

/// How bytes are carried to the remote end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Plain TCP relay (`socat`).
    #[default]
    Plain,
    /// Encrypted tunnel (`ssh -L`).
    Encrypted,
}

impl Transport {
    /// Returns [`Transport::Encrypted`] when `encrypted` is set.
    pub fn from_flag(encrypted: bool) -> Self {
        if encrypted {
            Transport::Encrypted
        } else {
            Transport::Plain
        }
    }
}

/// One configured forward. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Stable identity (source line number).
    pub id: UnitId,
    /// Transport used for the forward.
    pub transport: Transport,
    /// Local port to listen on.
    pub local_port: u16,
    /// Remote host to forward to.
    pub remote: String,
    /// Port on the remote host.
    pub remote_port: u16,
}

impl fmt::Display for ProxyConfig {
    /// Renders as `<local_port>:<remote>:<remote_port>`, the proxy list syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.local_port, self.remote, self.remote_port)
    }
}

/// A [`ProxyConfig`] bound to the process runner that executes it.
pub struct ProxyUnit {
    config: ProxyConfig,
    name: String,
    runner: Arc<dyn ProcessRunner>,
}

impl ProxyUnit {
    /// Creates a unit for `config`, executed through `runner`.
    pub fn new(config: ProxyConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        let name = config.to_string();
        Self {
            config,
            name,
            runner,
        }
    }
}

#[async_trait]
impl Unit for ProxyUnit {
    fn id(&self) -> UnitId {
        self.config.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<(), UnitError> {
        let cmd = build_command(&self.config);
        let out = self
            .runner
            .run(&cmd)
            .await
            .map_err(|error| UnitError::Spawn {
                program: cmd.program.clone(),
                error,
            })?;

        if out.success {
            Ok(())
        } else {
            Err(UnitError::Exited {
                status: out.status,
                output: out.output,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{CommandSpec, ProcessOutput};
    use std::io;
    use std::sync::Mutex;

    struct FakeRunner {
        result: fn() -> io::Result<ProcessOutput>,
        seen: Mutex<Vec<CommandSpec>>,
    }

    impl FakeRunner {
        fn new(result: fn() -> io::Result<ProcessOutput>) -> Arc<Self> {
            Arc::new(Self {
                result,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ProcessRunner for FakeRunner {
        async fn run(&self, cmd: &CommandSpec) -> io::Result<ProcessOutput> {
            self.seen.lock().unwrap().push(cmd.clone());
            (self.result)()
        }
    }

    fn config(transport: Transport) -> ProxyConfig {
        ProxyConfig {
            id: UnitId::new(4),
            transport,
            local_port: 8080,
            remote: "db.internal".into(),
            remote_port: 5432,
        }
    }

    #[test]
    fn name_uses_proxy_list_syntax() {
        let unit = ProxyUnit::new(config(Transport::Plain), FakeRunner::new(|| unreachable!()));
        assert_eq!(unit.name(), "8080:db.internal:5432");
        assert_eq!(unit.id(), UnitId::new(4));
    }

    #[tokio::test]
    async fn clean_exit_is_ok() {
        let runner = FakeRunner::new(|| {
            Ok(ProcessOutput {
                success: true,
                status: "exit status: 0".into(),
                output: String::new(),
            })
        });
        let unit = ProxyUnit::new(config(Transport::Encrypted), runner.clone());

        unit.execute().await.expect("clean exit");
        let seen = runner.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].program, "ssh");
    }

    #[tokio::test]
    async fn failed_exit_carries_output() {
        let runner = FakeRunner::new(|| {
            Ok(ProcessOutput {
                success: false,
                status: "exit status: 1".into(),
                output: "Connection refused\n".into(),
            })
        });
        let unit = ProxyUnit::new(config(Transport::Plain), runner);

        let err = unit.execute().await.unwrap_err();
        assert_eq!(err.as_label(), "unit_exited");
        assert_eq!(err.output(), Some("Connection refused\n"));
    }

    #[tokio::test]
    async fn spawn_failure_is_a_unit_error() {
        let runner = FakeRunner::new(|| Err(io::Error::new(io::ErrorKind::NotFound, "no socat")));
        let unit = ProxyUnit::new(config(Transport::Plain), runner);

        let err = unit.execute().await.unwrap_err();
        assert_eq!(err.as_label(), "unit_spawn_failed");
        assert!(err.to_string().starts_with("failed to start socat"));
    }
}
