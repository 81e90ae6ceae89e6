//! proxyvisor - keeps the forwards listed in a proxy file alive.
//!
//! Reads `<local_port>:<remote_host>:<remote_port>` lines, starts one `socat`
//! (or `ssh -L` with `--encrypted`) per line and restarts each one whenever it
//! exits. A forward that dies more than `--max-restarts` times in a row waits
//! `--backoff-secs` before its next attempt.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use proxyvisor::{
    LogWriter, ProxyList, Subscribe, Supervisor, SupervisorConfig, SystemRunner, Transport,
};

#[derive(Debug, Parser)]
#[command(name = "proxyvisor", version, about)]
struct Args {
    /// Tunnel every forward through `ssh -L` instead of `socat`.
    #[arg(short, long, env = "PROXYVISOR_ENCRYPTED")]
    encrypted: bool,

    /// Proxy list file.
    #[arg(short, long, env = "PROXYVISOR_PROXIES", default_value = "proxies.list")]
    proxies: PathBuf,

    /// Consecutive deaths restarted immediately before a backoff kicks in.
    #[arg(long, env = "PROXYVISOR_MAX_RESTARTS", default_value_t = 3)]
    max_restarts: u32,

    /// Backoff delay in seconds.
    #[arg(long, env = "PROXYVISOR_BACKOFF_SECS", default_value_t = 120)]
    backoff_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    proxyvisor::observability::init_tracing();

    let transport = Transport::from_flag(args.encrypted);
    let proxies = ProxyList::load(&args.proxies, transport)?;
    tracing::info!(
        file = %proxies.path().display(),
        count = proxies.len(),
        ?transport,
        "proxy list loaded"
    );

    let cfg = SupervisorConfig {
        max_restarts: args.max_restarts,
        backoff: Duration::from_secs(args.backoff_secs),
        ..SupervisorConfig::default()
    };
    let log: Arc<dyn Subscribe> = Arc::new(LogWriter::new().with_max_restarts(args.max_restarts));
    let subs = vec![log];
    let sup = Supervisor::new(cfg, subs);

    let token = CancellationToken::new();
    let stop = token.clone();
    tokio::spawn(async move {
        match proxyvisor::wait_for_shutdown_signal().await {
            Ok(signal) => {
                tracing::info!(signal, "shutdown signal received");
                stop.cancel();
            }
            Err(err) => tracing::error!(error = %err, "signal handler unavailable"),
        }
    });

    let units = proxies.into_units(Arc::new(SystemRunner));
    sup.run(units, token)
        .await
        .with_context(|| format!("supervising {}", args.proxies.display()))?;
    Ok(())
}
