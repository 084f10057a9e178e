//! Termination signal and graceful shutdown handling.

use log::{info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `cancel` when the process receives Ctrl-C.
///
/// The returned task ends on its own after the first signal; it is aborted
/// by [`shutdown_gracefully`] if the monitor stops for another reason.
pub fn install_ctrl_c_handler(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, finishing the current cycle");
                cancel.cancel();
            }
            Err(e) => warn!("Unable to listen for Ctrl-C: {e}"),
        }
    })
}

/// Stops background tasks once the monitor loop has returned.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    signal_task: Option<JoinHandle<()>>,
    rate_limiter_shutdown: Option<CancellationToken>,
) {
    cancel.cancel();
    if let Some(task) = signal_task {
        task.abort();
        let _ = task.await;
    }

    if let Some(shutdown) = rate_limiter_shutdown {
        shutdown.cancel();
    }
}
