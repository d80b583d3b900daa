// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! Installs handlers for SIGTERM and SIGINT (Ctrl+C), triggering a
//! [`CancellationToken`] that the event loop monitors. In-flight event
//! handlers are drained before the process exits.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is received.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {
                            info!("received SIGINT (Ctrl+C), initiating shutdown");
                        }
                        _ = sigterm.recv() => {
                            info!("received SIGTERM, initiating shutdown");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Waits up to `timeout` for every task in `tasks` to finish.
///
/// Returns `true` when the tracker drained in time.
pub async fn drain_tasks(tasks: &TaskTracker, timeout: Duration) -> bool {
    tasks.close();
    let in_flight = tasks.len();
    if in_flight == 0 {
        debug!("no in-flight event handlers to drain");
        return true;
    }

    info!(count = in_flight, "waiting for in-flight event handlers");
    match tokio::time::timeout(timeout, tasks.wait()).await {
        Ok(()) => {
            info!("event handlers drained");
            true
        }
        Err(_) => {
            warn!(
                remaining = tasks.len(),
                "timeout reached, some event handlers interrupted"
            );
            false
        }
    }
}
