//! Ledger event listener
//!
//! Subscribes to the manager's broadcast channel and logs each committed
//! change. When the listener lags and events are lost, a full GP recompute is
//! run so downstream views can rely on persisted values.

use super::manager::OrdersManager;
use shared::order::LedgerEvent;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

pub async fn run_event_listener(
    manager: Arc<OrdersManager>,
    mut event_rx: broadcast::Receiver<LedgerEvent>,
    shutdown: CancellationToken,
) {
    tracing::info!(epoch = %manager.epoch(), "Ledger event listener started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Ledger event listener shutting down");
                break;
            }
            result = event_rx.recv() => {
                match result {
                    Ok(event) => {
                        tracing::debug!(
                            order_no = %event.order_no,
                            version = event.version,
                            event_type = ?event.event_type(),
                            "Ledger event"
                        );
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(missed = n, "Ledger event listener lagged, running full recompute");
                        let manager = Arc::clone(&manager);
                        if let Err(e) = tokio::task::spawn_blocking(move || manager.recompute_all()).await {
                            tracing::error!(error = %e, "Recovery recompute join failed");
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event channel closed, ledger event listener stopping");
                        break;
                    }
                }
            }
        }
    }
}
