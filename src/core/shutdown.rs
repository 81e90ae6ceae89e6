//! Termination signals for the binary.
//!
//! [`wait_for_shutdown_signal`] resolves with the name of the first signal
//! received; the caller cancels the token handed to
//! [`Supervisor::run`](crate::Supervisor::run). Unix listens for `SIGINT`,
//! `SIGTERM` and `SIGQUIT`; elsewhere only Ctrl-C is available.

use std::io;

/// Waits for a termination signal and returns its name.
///
/// Returns `Err` if the handlers cannot be registered.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut int = signal(SignalKind::interrupt())?;
    let mut term = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = int.recv() => "SIGINT",
        _ = term.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Waits for Ctrl-C.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}
