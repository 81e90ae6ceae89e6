//! Tracing setup for the `proxyvisor` binary.
//!
//! The binary's records come from two places: startup (`proxy list loaded`,
//! signal handling) and the [`LogWriter`](crate::LogWriter) subscriber, which
//! logs every launch, failure, captured `socat`/`ssh` output and backoff under
//! the `proxyvisor` target. `RUST_LOG=proxyvisor=debug` narrows to those.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Environment variable selecting the log format (`json` or anything else for text).
pub const LOG_FORMAT_ENV: &str = "PROXYVISOR_LOG_FORMAT";

/// Initialize the tracing subscriber once for the process.
///
/// Logs go to stderr. Format defaults to compact text and can be switched to
/// JSON via `PROXYVISOR_LOG_FORMAT=json`. Filter defaults to `info` if
/// `RUST_LOG` is unset.
pub fn init_tracing() {
    TRACING_INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let json = std::env::var(LOG_FORMAT_ENV)
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let result = if json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .try_init()
        };

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}
