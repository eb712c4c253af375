//! # Interrupt handling for supervisors without a caller-supplied context.
//!
//! Provides [`wait_for_shutdown_signal`] an async helper that completes when the process
//! receives a termination signal, and [`bind_interrupt`] which ties it to a cancel scope.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use crate::context::{CancelHandle, Context};
use crate::events::{Bus, Event, EventKind};
use crate::logging::Logger;

/// Waits for a termination signal.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(not(unix))]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Derives a root scope from `parent` that is canceled on the first termination signal.
///
/// The watcher task exits once the root ends for any reason, so cancelling the
/// returned handle also stops listening.
pub(crate) fn bind_interrupt(parent: &Context, logger: Logger, bus: Bus) -> (Context, CancelHandle) {
    let (root, cancel) = parent.with_cancel();
    let watched = root.clone();
    let trigger = cancel.clone();

    tokio::spawn(async move {
        tokio::select! {
            res = wait_for_shutdown_signal() => match res {
                Ok(()) => {
                    logger.info("interrupt signal received");
                    bus.publish(Event::new(EventKind::InterruptReceived));
                    trigger.cancel();
                }
                Err(err) => {
                    logger.warn(format_args!("cannot listen for interrupt signals: {err}"));
                    watched.done().await;
                }
            },
            _ = watched.done() => {}
        }
    });

    (root, cancel)
}
