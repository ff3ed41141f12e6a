use crate::components::dashboard::DashboardRegistry;
use tokio::sync::oneshot;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
#[cfg(windows)]
use tokio::signal::windows::{ctrl_break, ctrl_c};

/// Wait for a termination signal, stop every dashboard, then release the server
pub async fn handle_signals(shutdown_send: oneshot::Sender<()>, dashboards: DashboardRegistry) {
    wait_for_signal().await;

    // Let the server stop accepting requests first
    let _ = shutdown_send.send(());

    dashboards.shutdown_all().await;
    info!("All dashboards shut down");
}

/// Platform-specific signal handling implementation
#[cfg(unix)]
pub async fn wait_for_signal() {
    // SIGTERM from the process supervisor, SIGINT from Ctrl+C
    let handlers = signal(SignalKind::terminate())
        .and_then(|sigterm| signal(SignalKind::interrupt()).map(|sigint| (sigterm, sigint)));

    let (mut sigterm, mut sigint) = match handlers {
        Ok(handlers) => handlers,
        Err(e) => {
            error!("Failed to install signal handlers: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT signal, initiating graceful shutdown");
        }
    }
}

/// Platform-specific signal handling implementation
#[cfg(windows)]
pub async fn wait_for_signal() {
    let handlers = ctrl_c().and_then(|ctrlc| ctrl_break().map(|ctrlbreak| (ctrlc, ctrlbreak)));

    let (mut ctrlc, mut ctrlbreak) = match handlers {
        Ok(handlers) => handlers,
        Err(e) => {
            error!("Failed to install signal handlers: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = ctrlc.recv() => {
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        }
        _ = ctrlbreak.recv() => {
            info!("Received Ctrl+Break signal, initiating graceful shutdown");
        }
    }
}
