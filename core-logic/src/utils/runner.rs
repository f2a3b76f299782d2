use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Token cancelled on the first Ctrl+C. The dispatcher checks it between
/// transfers, so the transfer in flight still completes.
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let cloned_token = token.clone();

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!(
                    target: "task_result",
                    "🛑 Received Ctrl+C. Stopping after the current transaction..."
                );
                cloned_token.cancel();
            }
            Err(err) => {
                error!("Unable to listen for shutdown signal: {}", err);
            }
        }
    });

    token
}
